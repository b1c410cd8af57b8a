//! Logical key events and the normalization tables shared by every capture
//! backend.
//!
//! Raw input arrives in three shapes: plain characters, ANSI escape sequences
//! (`ESC [ A` for the up arrow) and console extended keys (a `0x00`/`0xE0`
//! prefix followed by a scan code). All of them collapse into [`KeyEvent`].

/// Escape byte that starts an ANSI sequence.
pub const ESC: u8 = 0x1b;

/// Ctrl-C as delivered by a terminal in raw mode.
const ETX: u8 = 0x03;

/// Number of bytes read after an escape byte to complete a sequence.
pub const ESCAPE_LOOKAHEAD: usize = 2;

/// A single normalized keypress.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Up,
    Down,
    Left,
    Right,
    Space,
    Pause,
    Quit,
    /// Anything outside the vocabulary, carried as the bytes that produced it.
    Other(Vec<u8>),
}

/// Normalize a single key or key name.
///
/// Alphabetic keys are case-folded first, then WASD and space are folded onto
/// the same events the arrow keys and the space bar produce, so
/// `translate("w") == translate("up")`.
pub fn translate(raw: &str) -> KeyEvent {
    let key = raw.to_lowercase();
    match key.as_str() {
        "up" | "w" => KeyEvent::Up,
        "down" | "s" => KeyEvent::Down,
        "left" | "a" => KeyEvent::Left,
        "right" | "d" => KeyEvent::Right,
        "space" | " " => KeyEvent::Space,
        "pause" | "p" => KeyEvent::Pause,
        "quit" | "q" => KeyEvent::Quit,
        _ => KeyEvent::Other(key.into_bytes()),
    }
}

/// Decode one complete raw read: a character, an escape sequence, or a
/// control byte.
pub fn from_bytes(raw: &[u8]) -> KeyEvent {
    match raw {
        [ESC, ..] => decode_escape(raw),
        [ETX] => KeyEvent::Quit,
        _ => match std::str::from_utf8(raw) {
            Ok(text) => translate(text),
            Err(_) => KeyEvent::Other(raw.to_vec()),
        },
    }
}

/// Map an escape sequence to a direction.
///
/// Both the normal (`ESC [`) and application (`ESC O`) cursor forms are
/// recognized. Anything else comes back verbatim as [`KeyEvent::Other`].
pub fn decode_escape(seq: &[u8]) -> KeyEvent {
    match seq {
        [ESC, b'[' | b'O', b'A'] => KeyEvent::Up,
        [ESC, b'[' | b'O', b'B'] => KeyEvent::Down,
        [ESC, b'[' | b'O', b'C'] => KeyEvent::Right,
        [ESC, b'[' | b'O', b'D'] => KeyEvent::Left,
        _ => KeyEvent::Other(seq.to_vec()),
    }
}

/// True for the bytes a console uses to announce an extended key.
pub fn is_extended_prefix(byte: u8) -> bool {
    matches!(byte, 0x00 | 0xe0)
}

/// Map a console extended key (prefix byte, scan code) to a direction.
///
/// Returns `None` when `prefix` is not an extended-key prefix. Unknown scan
/// codes map to an empty [`KeyEvent::Other`], since the code alone carries no
/// printable meaning.
pub fn decode_extended(prefix: u8, code: u8) -> Option<KeyEvent> {
    if !is_extended_prefix(prefix) {
        return None;
    }
    Some(match code {
        b'H' => KeyEvent::Up,
        b'P' => KeyEvent::Down,
        b'K' => KeyEvent::Left,
        b'M' => KeyEvent::Right,
        _ => KeyEvent::Other(Vec::new()),
    })
}

/// Length of the UTF-8 sequence introduced by `lead`. Invalid lead bytes count
/// as a single byte.
pub(crate) fn utf8_len(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}
