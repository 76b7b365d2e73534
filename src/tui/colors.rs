//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Bot message headers and the focused button
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// User message headers
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Status bar while reporting an error
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Status bar background otherwise
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
