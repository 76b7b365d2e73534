//! Layout helpers.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Span;

/// A rectangle of `percent_x` by `percent_y` centered inside `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Break `text` into lines of at most `width` terminal columns.
///
/// Existing line breaks are kept; long lines are split at the last space that
/// fits, or mid-word when there is none. Wide characters such as the status
/// glyphs count as two columns.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for line in text.split('\n') {
        let mut current: Vec<(char, usize)> = Vec::new();
        let mut used = 0;
        for c in line.chars() {
            let w = char_width(c);
            if used + w > width && !current.is_empty() {
                if c == ' ' {
                    out.push(collect_chars(&current));
                    current.clear();
                    used = 0;
                    continue;
                }
                let carry = match current.iter().rposition(|&(ch, _)| ch == ' ') {
                    Some(pos) if pos > 0 => {
                        let rest = current.split_off(pos + 1);
                        current.pop();
                        rest
                    }
                    _ => Vec::new(),
                };
                out.push(collect_chars(&current));
                used = carry.iter().map(|&(_, w)| w).sum();
                current = carry;
            }
            current.push((c, w));
            used += w;
        }
        out.push(collect_chars(&current));
    }
    out
}

/// Columns `c` occupies, as ratatui measures it when rendering.
fn char_width(c: char) -> usize {
    let mut buf = [0u8; 4];
    let s: &str = c.encode_utf8(&mut buf);
    Span::raw(s).width()
}

fn collect_chars(chars: &[(char, usize)]) -> String {
    chars.iter().map(|&(c, _)| c).collect()
}
