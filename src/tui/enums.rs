//! Enumerations for TUI state management.

/// Which part of the chat window receives key presses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    /// Typing a message.
    Chat,
    /// Choosing one of the inline buttons of the last prompt.
    Keyboard,
    /// Key binding overlay.
    Help,
}

/// Author of a transcript entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn display_name(self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "ToDo bot",
        }
    }
}
