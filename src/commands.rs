//! The command vocabulary published to the mailbox.

use std::fmt;

use crate::keys::KeyEvent;

/// A command the game engine understands.
///
/// The mailbox stores only the first character of the command name, so
/// `Space` is published as `s` and `Down` as `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Space,
    Pause,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Up,
        Command::Down,
        Command::Left,
        Command::Right,
        Command::Space,
        Command::Pause,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Up => "up",
            Command::Down => "down",
            Command::Left => "left",
            Command::Right => "right",
            Command::Space => "space",
            Command::Pause => "pause",
        }
    }

    /// The single-character code written to the `cmd` column.
    pub fn code(self) -> &'static str {
        &self.name()[..1]
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the publish loop does with one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Publish(Command),
    Ignore,
    Quit,
}

impl From<&KeyEvent> for Action {
    fn from(event: &KeyEvent) -> Self {
        match event {
            KeyEvent::Up => Action::Publish(Command::Up),
            KeyEvent::Down => Action::Publish(Command::Down),
            KeyEvent::Left => Action::Publish(Command::Left),
            KeyEvent::Right => Action::Publish(Command::Right),
            KeyEvent::Space => Action::Publish(Command::Space),
            KeyEvent::Pause => Action::Publish(Command::Pause),
            KeyEvent::Quit => Action::Quit,
            KeyEvent::Other(_) => Action::Ignore,
        }
    }
}
