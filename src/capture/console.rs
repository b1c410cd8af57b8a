//! Per-key console capture on top of crossterm's event reader.
//!
//! The console reader hands out keys that are already decoded, including the
//! extended keys a Windows console announces with a `0x00`/`0xE0` prefix, so
//! this module only has to map key codes onto [`KeyEvent`].

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKey, KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal;
use tracing::{error, trace};

use super::KeyCapture;
use crate::error::CaptureError;
use crate::keys::{self, KeyEvent, ESC};

/// Console raw mode for as long as the guard lives.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn engage() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            error!("Failed to restore console mode: {}", err);
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleCapture;

impl ConsoleCapture {
    pub fn new() -> Self {
        Self
    }
}

impl KeyCapture for ConsoleCapture {
    fn read_next_key(&mut self) -> Result<KeyEvent, CaptureError> {
        let _raw = RawModeGuard::engage()?;
        loop {
            if let Some(key) = map_event(event::read()?) {
                trace!("Read key {:?}", key);
                return Ok(key);
            }
        }
    }
}

/// Keep key presses (and auto-repeats), drop releases, mouse, resize and
/// focus events.
pub fn map_event(ev: CrosstermEvent) -> Option<KeyEvent> {
    match ev {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Some(map_key(key)),
        _ => None,
    }
}

pub fn map_key(key: CrosstermKey) -> KeyEvent {
    match key.code {
        KeyCode::Up => KeyEvent::Up,
        KeyCode::Down => KeyEvent::Down,
        KeyCode::Left => KeyEvent::Left,
        KeyCode::Right => KeyEvent::Right,
        KeyCode::Char('c') | KeyCode::Char('C')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            KeyEvent::Quit
        }
        KeyCode::Char(c) => keys::translate(&c.to_string()),
        KeyCode::Esc => KeyEvent::Other(vec![ESC]),
        KeyCode::Enter => KeyEvent::Other(b"\r".to_vec()),
        KeyCode::Tab => KeyEvent::Other(b"\t".to_vec()),
        KeyCode::Backspace => KeyEvent::Other(vec![0x08]),
        // Function keys, Home/End and friends have no printable form.
        _ => KeyEvent::Other(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};

    fn press(code: KeyCode) -> CrosstermEvent {
        CrosstermEvent::Key(CrosstermKey::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn arrow_keys_map_to_directions() {
        assert_eq!(map_event(press(KeyCode::Up)), Some(KeyEvent::Up));
        assert_eq!(map_event(press(KeyCode::Down)), Some(KeyEvent::Down));
        assert_eq!(map_event(press(KeyCode::Left)), Some(KeyEvent::Left));
        assert_eq!(map_event(press(KeyCode::Right)), Some(KeyEvent::Right));
    }

    #[test]
    fn characters_go_through_the_shared_table() {
        assert_eq!(map_event(press(KeyCode::Char('W'))), Some(KeyEvent::Up));
        assert_eq!(map_event(press(KeyCode::Char(' '))), Some(KeyEvent::Space));
        assert_eq!(map_event(press(KeyCode::Char('p'))), Some(KeyEvent::Pause));
        assert_eq!(
            map_event(press(KeyCode::Char('z'))),
            Some(KeyEvent::Other(b"z".to_vec()))
        );
    }

    #[test]
    fn ctrl_c_quits() {
        let key = CrosstermKey::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), KeyEvent::Quit);
    }

    #[test]
    fn unknown_extended_keys_are_empty_noise() {
        assert_eq!(
            map_event(press(KeyCode::F(5))),
            Some(KeyEvent::Other(Vec::new()))
        );
        assert_eq!(map_event(press(KeyCode::Esc)), Some(KeyEvent::Other(vec![ESC])));
    }

    #[test]
    fn releases_and_non_key_events_are_skipped() {
        let release = CrosstermKey {
            code: KeyCode::Up,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_event(CrosstermEvent::Key(release)), None);
        assert_eq!(map_event(CrosstermEvent::Resize(80, 24)), None);
        let mouse = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(map_event(CrosstermEvent::Mouse(mouse)), None);
    }
}
