//! Main application logic for the terminal chat window.
//!
//! This module contains the `ChatApp` struct which keeps the transcript,
//! forwards typed messages and button presses to the [`Bot`], and renders the
//! conversation the way a chat client would: newest messages at the bottom,
//! inline buttons under the prompt that carries them.

use std::io;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::error;

use crate::bot::{Bot, Button, Reply};
use crate::tui::{
    colors::{DARK_GREEN, DARK_PURPLE, DARK_RED, GOLD},
    enums::{AppState, Sender},
    input::InputField,
    utils::{centered_rect, wrap_text},
};

/// One entry of the conversation.
#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub at: DateTime<Local>,
    /// Inline buttons; emptied once one of them is pressed.
    pub keyboard: Vec<Button>,
}

impl ChatMessage {
    fn new(sender: Sender, text: String, keyboard: Vec<Button>) -> Self {
        ChatMessage {
            sender,
            text,
            at: Local::now(),
            keyboard,
        }
    }
}

/// State of the chat window.
pub struct ChatApp<'a> {
    bot: &'a Bot,
    state: AppState,
    messages: Vec<ChatMessage>,
    input: InputField,
    history: Vec<String>,
    history_pos: Option<usize>,
    /// Index into `messages` of the prompt whose buttons are still live.
    active_keyboard: Option<usize>,
    selected_button: usize,
    /// Lines scrolled up from the bottom of the transcript.
    scroll: usize,
    status_message: String,
    status_is_error: bool,
}

impl<'a> ChatApp<'a> {
    /// Create the window, opening with the usage text as `/start` would.
    pub fn new(bot: &'a Bot) -> Self {
        let mut app = ChatApp {
            bot,
            state: AppState::Chat,
            messages: Vec::new(),
            input: InputField::new(),
            history: Vec::new(),
            history_pos: None,
            active_keyboard: None,
            selected_button: 0,
            scroll: 0,
            status_message: String::new(),
            status_is_error: false,
        };
        app.push_reply(bot.help());
        app
    }

    fn push_reply(&mut self, reply: Reply) {
        let has_keyboard = !reply.keyboard.is_empty();
        self.messages
            .push(ChatMessage::new(Sender::Bot, reply.text, reply.keyboard));
        if has_keyboard {
            // A newer prompt replaces the buttons of an older one.
            if let Some(old) = self.active_keyboard.take() {
                self.messages[old].keyboard.clear();
            }
            self.active_keyboard = Some(self.messages.len() - 1);
            self.selected_button = 0;
            self.state = AppState::Keyboard;
        }
        self.scroll = 0;
    }

    fn set_error(&mut self, msg: String) {
        self.status_message = msg;
        self.status_is_error = true;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
        self.status_is_error = false;
    }

    /// Send the typed message. Returns true if the user asked to quit.
    pub fn submit(&mut self) -> bool {
        let text = self.input.take();
        let text = text.trim();
        self.history_pos = None;
        if text.is_empty() {
            return false;
        }
        if matches!(text, "/quit" | "/exit") {
            return true;
        }

        self.history.push(text.to_string());
        self.messages
            .push(ChatMessage::new(Sender::User, text.to_string(), Vec::new()));
        self.scroll = 0;

        match self.bot.handle_message(text) {
            Ok(Some(reply)) => self.push_reply(reply),
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, message = text, "chat command failed");
                self.set_error(format!("Error: {e}"));
            }
        }
        false
    }

    /// Press the selected button of the live prompt.
    ///
    /// The prompt is edited in place to show the outcome, like a chat client
    /// editing the bot message the buttons belonged to.
    pub fn press_selected_button(&mut self) {
        self.state = AppState::Chat;
        let Some(idx) = self.active_keyboard else {
            return;
        };
        let Some(button) = self.messages[idx].keyboard.get(self.selected_button).cloned() else {
            return;
        };

        match self.bot.handle_callback(&button.data) {
            Ok(reply) => {
                let message = &mut self.messages[idx];
                message.text = reply.text;
                message.keyboard = reply.keyboard;
                message.at = Local::now();
                if message.keyboard.is_empty() {
                    self.active_keyboard = None;
                }
            }
            Err(e) => {
                error!(error = %e, data = %button.data, "button press failed");
                self.set_error(format!("Error: {e}"));
            }
        }
    }

    fn live_buttons(&self) -> &[Button] {
        self.active_keyboard
            .map(|idx| self.messages[idx].keyboard.as_slice())
            .unwrap_or(&[])
    }

    fn recall_history(&mut self, older: bool) {
        if self.history.is_empty() {
            return;
        }
        let pos = match (self.history_pos, older) {
            (None, true) => Some(self.history.len() - 1),
            (None, false) => None,
            (Some(p), true) => Some(p.saturating_sub(1)),
            (Some(p), false) if p + 1 < self.history.len() => Some(p + 1),
            (Some(_), false) => None,
        };
        self.history_pos = pos;
        self.input = InputField::new();
        if let Some(p) = pos {
            self.history[p].clone().chars().for_each(|c| self.input.handle_char(c));
        }
    }

    /// Handle keyboard input while typing.
    /// Returns true if the application should quit.
    fn handle_chat_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Esc => {
                if self.input.value.is_empty() {
                    return true;
                }
                self.input = InputField::new();
            }
            KeyCode::Tab => {
                if !self.live_buttons().is_empty() {
                    self.state = AppState::Keyboard;
                }
            }
            KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::Char(c) => self.input.handle_char(c),
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Up => self.recall_history(true),
            KeyCode::Down => self.recall_history(false),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_add(5),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_sub(5),
            _ => {}
        }
        false
    }

    /// Handle keyboard input while a prompt's buttons have focus.
    fn handle_keyboard_input(&mut self, key: KeyEvent) -> bool {
        let count = self.live_buttons().len();
        match key.code {
            KeyCode::Left if self.selected_button > 0 => self.selected_button -= 1,
            KeyCode::Right if self.selected_button + 1 < count => self.selected_button += 1,
            KeyCode::Enter | KeyCode::Char(' ') => self.press_selected_button(),
            KeyCode::Tab | KeyCode::Esc => self.state = AppState::Chat,
            KeyCode::Char(c) => {
                // Start typing straight away; the buttons stay available.
                self.state = AppState::Chat;
                self.input.handle_char(c);
            }
            _ => {}
        }
        false
    }

    /// Dispatch one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        // Ctrl+C quits whichever part has focus.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        self.clear_status_message();
        match self.state {
            AppState::Chat => self.handle_chat_input(key),
            AppState::Keyboard => self.handle_keyboard_input(key),
            AppState::Help => {
                self.state = AppState::Chat;
                false
            }
        }
    }

    /// Poll for and handle one terminal event.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    /// Transcript as display lines wrapped to `width`.
    fn transcript_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in &self.messages {
            let color = match message.sender {
                Sender::User => DARK_GREEN,
                Sender::Bot => GOLD,
            };
            lines.push(Line::from(vec![
                Span::styled(
                    message.at.format("%H:%M ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    message.sender.display_name(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]));
            for line in wrap_text(&message.text, width.saturating_sub(2)) {
                lines.push(Line::from(format!("  {line}")));
            }
            lines.push(Line::from(""));
        }
        lines
    }

    /// Render the conversation, bottom-aligned and scrolled by `self.scroll`.
    fn render_transcript(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default().title(" ToDo ").borders(Borders::ALL);
        let inner = block.inner(area);
        let lines = self.transcript_lines(inner.width as usize);

        let height = inner.height as usize;
        let max_scroll = lines.len().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
        let top = max_scroll - self.scroll;
        let top = u16::try_from(top).unwrap_or(u16::MAX);

        let paragraph = Paragraph::new(lines).block(block).scroll((top, 0));
        f.render_widget(paragraph, area);
    }

    /// Render the inline buttons of the live prompt.
    fn render_buttons(&mut self, f: &mut Frame, area: Rect) {
        let focused = self.state == AppState::Keyboard;
        let mut spans = Vec::new();
        for (i, button) in self.live_buttons().iter().enumerate() {
            let style = if focused && i == self.selected_button {
                Style::default().bg(GOLD).fg(Color::Rgb(20, 20, 20)).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::REVERSED)
            };
            spans.push(Span::styled(format!(" {} ", button.label), style));
            spans.push(Span::raw("  "));
        }
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    /// Render the message input line and place the cursor.
    fn render_input(&mut self, f: &mut Frame, area: Rect) {
        let focused = self.state == AppState::Chat;
        let block = Block::default()
            .title(" Message ")
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            });
        let inner_width = area.width.saturating_sub(2) as usize;

        // Keep the cursor visible on long input.
        let offset = self.input.cursor.saturating_sub(inner_width.saturating_sub(1));
        let visible: String = self.input.value.chars().skip(offset).take(inner_width).collect();
        f.render_widget(Paragraph::new(visible).block(block), area);

        if focused {
            let x = area.x + 1 + (self.input.cursor - offset) as u16;
            f.set_cursor_position((x, area.y + 1));
        }
    }

    /// Render the key binding overlay.
    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 60, area);
        f.render_widget(Clear, area);
        let text = vec![
            Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("Enter        send message / press button"),
            Line::from("Tab          switch between input and buttons"),
            Line::from("Left/Right   move cursor / choose button"),
            Line::from("Up/Down      previous messages"),
            Line::from("PgUp/PgDn    scroll conversation"),
            Line::from("Esc, Ctrl+C  quit (Esc clears typed text first)"),
            Line::from(""),
            Line::from("Send /help for the bot commands."),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().title(" Help ").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::Chat if self.live_buttons().is_empty() => {
                    "Enter send | F1 keys | Esc quit".to_string()
                }
                AppState::Chat => "Enter send | Tab buttons | F1 keys | Esc quit".to_string(),
                AppState::Keyboard => "Left/Right choose | Enter press | Tab back to input".to_string(),
                AppState::Help => "Press any key to close".to_string(),
            }
        };
        let bg = if self.status_is_error { DARK_RED } else { DARK_PURPLE };
        let status = Paragraph::new(text)
            .style(Style::default().bg(bg).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function.
    fn render(&mut self, f: &mut Frame) {
        let button_height = if self.live_buttons().is_empty() { 0 } else { 3 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(button_height),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_transcript(f, chunks[0]);
        if button_height > 0 {
            self.render_buttons(f, chunks[1]);
        }
        self.render_input(f, chunks[2]);
        self.render_status_bar(f, chunks[3]);

        if self.state == AppState::Help {
            self.render_help(f, chunks[0]);
        }
    }

    /// Main event loop for the chat window.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::fields::Locale;
    use ratatui::backend::TestBackend;

    fn bot() -> Bot {
        Bot::new(Database::open_in_memory().unwrap(), Locale::En)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_line(app: &mut ChatApp<'_>, text: &str) -> bool {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter))
    }

    fn last_text(app: &ChatApp<'_>) -> String {
        app.messages.last().unwrap().text.clone()
    }

    #[test]
    fn test_starts_with_help() {
        let bot = bot();
        let app = ChatApp::new(&bot);
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].text, Locale::En.help());
    }

    #[test]
    fn test_typed_message_gets_reply() {
        let bot = bot();
        let mut app = ChatApp::new(&bot);
        assert!(!type_line(&mut app, "/todo find socks"));
        let n = app.messages.len();
        assert_eq!(app.messages[n - 2].sender, Sender::User);
        assert_eq!(app.messages[n - 2].text, "/todo find socks");
        assert_eq!(last_text(&app), "Task added: 1");
    }

    #[test]
    fn test_clear_buttons_edit_prompt() {
        let bot = bot();
        let mut app = ChatApp::new(&bot);
        type_line(&mut app, "/todo a");
        type_line(&mut app, "/todo b");
        type_line(&mut app, "/done 2");
        type_line(&mut app, "/clear");
        assert_eq!(app.state, AppState::Keyboard);
        assert_eq!(app.messages.last().unwrap().keyboard.len(), 2);

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Chat);
        let prompt = app.messages.last().unwrap();
        assert_eq!(prompt.text, "Tasks deleted!");
        assert!(prompt.keyboard.is_empty());

        let ids: Vec<i64> = bot.database().get_list(None).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_typing_leaves_buttons_available() {
        let bot = bot();
        let mut app = ChatApp::new(&bot);
        type_line(&mut app, "/clear");
        type_line(&mut app, "/list");
        assert_eq!(last_text(&app), "You have no tasks!");
        assert_eq!(app.state, AppState::Chat);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::Keyboard);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Chat);
    }

    #[test]
    fn test_history_and_quit() {
        let bot = bot();
        let mut app = ChatApp::new(&bot);
        type_line(&mut app, "/list");
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.input.value, "/list");
        app.handle_key(key(KeyCode::Down));
        assert!(app.input.value.is_empty());

        assert!(type_line(&mut app, "/quit"));
        assert!(app.handle_key(key(KeyCode::Esc)));
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_glyph_at_exact_wrap_width_stays_visible() {
        let bot = bot();
        let mut app = ChatApp::new(&bot);
        type_line(&mut app, "/todo abcdefghijklmnopqrs");
        type_line(&mut app, "/list");

        let mut terminal = Terminal::new(TestBackend::new(30, 20)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let screen = screen_text(&terminal);
        assert!(screen.contains("1: abcdefghijklmnopqrs |"));
        assert!(screen.contains('\u{274c}'), "status glyph clipped:\n{screen}");
    }

    #[test]
    fn test_storage_failure_shows_in_status_bar() {
        let bot = bot();
        let mut app = ChatApp::new(&bot);
        bot.database().break_storage();

        assert!(!type_line(&mut app, "/list"));
        assert!(app.status_is_error);
        assert!(app.status_message.starts_with("Error: "));
        assert_eq!(app.messages.last().unwrap().text, "/list");

        // The window keeps working for commands that need no storage.
        type_line(&mut app, "/help");
        assert!(!app.status_is_error);
        assert_eq!(last_text(&app), Locale::En.help());
    }

    #[test]
    fn test_ctrl_c_quits_from_buttons_and_help() {
        let bot = bot();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        let mut app = ChatApp::new(&bot);
        type_line(&mut app, "/clear");
        assert_eq!(app.state, AppState::Keyboard);
        assert!(app.handle_key(ctrl_c));
        assert!(app.input.value.is_empty());

        let mut app = ChatApp::new(&bot);
        app.handle_key(key(KeyCode::F(1)));
        assert_eq!(app.state, AppState::Help);
        assert!(app.handle_key(ctrl_c));
    }

    #[test]
    fn test_renders_on_small_terminal() {
        let bot = bot();
        let mut app = ChatApp::new(&bot);
        type_line(&mut app, "/todo найти носки");
        type_line(&mut app, "/clear");
        app.handle_key(key(KeyCode::F(1)));

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        app.handle_key(key(KeyCode::PageUp));
        terminal.draw(|f| app.render(f)).unwrap();
    }
}
