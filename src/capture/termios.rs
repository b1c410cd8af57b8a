//! Byte-level key capture through the termios line discipline.

use std::io::{self, IsTerminal, Read, Stdin};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

use nix::sys::termios::{self, SetArg, SpecialCharacterIndices, Termios};
use tracing::{error, trace};

use super::KeyCapture;
use crate::error::CaptureError;
use crate::keys::{self, KeyEvent, ESC, ESCAPE_LOOKAHEAD};

/// How long to wait for the rest of an escape sequence, in tenths of a second.
const LOOKAHEAD_TIMEOUT_DS: u8 = 1;

/// Raw mode on a terminal for as long as the guard lives.
///
/// The mode in effect at [`TermiosGuard::engage`] is written back on drop,
/// whichever way the holder exits.
pub struct TermiosGuard<'fd> {
    fd: BorrowedFd<'fd>,
    original: Termios,
}

impl<'fd> TermiosGuard<'fd> {
    /// Capture the current mode of `fd` and switch it to raw mode: no echo,
    /// no line buffering, no signal keys, reads block for one byte.
    pub fn engage(fd: BorrowedFd<'fd>) -> io::Result<Self> {
        let original = termios::tcgetattr(fd)?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        termios::tcsetattr(fd, SetArg::TCSADRAIN, &raw)?;
        Ok(Self { fd, original })
    }

    /// Make subsequent reads return after `deciseconds` even when no byte
    /// arrived, so a lone escape key does not wait for more input.
    pub fn bound_reads(&self, deciseconds: u8) -> io::Result<()> {
        let mut bounded = termios::tcgetattr(self.fd)?;
        bounded.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        bounded.control_chars[SpecialCharacterIndices::VTIME as usize] = deciseconds;
        termios::tcsetattr(self.fd, SetArg::TCSANOW, &bounded)?;
        Ok(())
    }
}

impl Drop for TermiosGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = termios::tcsetattr(self.fd, SetArg::TCSADRAIN, &self.original) {
            error!("Failed to restore terminal mode: {}", err);
        }
    }
}

/// Reads keys from a byte stream, switching the attached terminal (if any)
/// into raw mode around every read.
pub struct TermiosCapture<R> {
    input: R,
    terminal: Option<OwnedFd>,
}

impl TermiosCapture<Stdin> {
    pub fn stdin() -> io::Result<Self> {
        Self::new(io::stdin())
    }
}

impl<R: Read + AsFd> TermiosCapture<R> {
    /// Capture from `input`. Raw mode is only used when `input` is a
    /// terminal; pipes and files are decoded as they are.
    pub fn new(input: R) -> io::Result<Self> {
        let fd = input.as_fd();
        let terminal = if fd.is_terminal() {
            Some(fd.try_clone_to_owned()?)
        } else {
            None
        };
        Ok(Self { input, terminal })
    }
}

impl<R: Read> TermiosCapture<R> {
    /// Decode keys from a plain byte stream without touching any terminal.
    pub fn detached(input: R) -> Self {
        Self {
            input,
            terminal: None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.terminal.is_some()
    }
}

impl<R: Read> KeyCapture for TermiosCapture<R> {
    fn read_next_key(&mut self) -> Result<KeyEvent, CaptureError> {
        let guard = match &self.terminal {
            Some(fd) => Some(TermiosGuard::engage(fd.as_fd())?),
            None => None,
        };
        let key = read_key(&mut self.input, guard.as_ref())?;
        trace!("Read key {:?}", key);
        Ok(key)
    }
}

fn read_key<R: Read>(
    input: &mut R,
    guard: Option<&TermiosGuard<'_>>,
) -> Result<KeyEvent, CaptureError> {
    let lead = read_byte(input)?.ok_or(CaptureError::Closed)?;
    let mut raw = vec![lead];

    let remaining = if lead == ESC {
        if let Some(guard) = guard {
            guard.bound_reads(LOOKAHEAD_TIMEOUT_DS)?;
        }
        ESCAPE_LOOKAHEAD
    } else {
        keys::utf8_len(lead) - 1
    };

    for _ in 0..remaining {
        match read_byte(input)? {
            Some(byte) => raw.push(byte),
            None => break,
        }
    }

    Ok(keys::from_bytes(&raw))
}

/// One byte, or `None` at end of input (or when a bounded read times out).
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::pty::openpty;
    use nix::sys::termios::{BaudRate, LocalFlags};
    use std::fs::File;
    use std::io::{Cursor, Write};
    use std::thread;
    use std::time::Duration;

    fn keys_from(bytes: &[u8]) -> Vec<KeyEvent> {
        let mut capture = TermiosCapture::detached(Cursor::new(bytes.to_vec()));
        let mut keys = Vec::new();
        loop {
            match capture.read_next_key() {
                Ok(key) => keys.push(key),
                Err(CaptureError::Closed) => return keys,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
    }

    fn assert_same_mode(before: &Termios, after: &Termios) {
        assert_eq!(termios::cfgetispeed(before), termios::cfgetispeed(after));
        assert_eq!(termios::cfgetospeed(before), termios::cfgetospeed(after));
        assert_eq!(before.input_flags, after.input_flags);
        assert_eq!(before.output_flags, after.output_flags);
        assert_eq!(before.control_flags, after.control_flags);
        assert_eq!(before.local_flags, after.local_flags);
        assert_eq!(before.control_chars, after.control_chars);
    }

    #[test]
    fn decodes_arrows_wasd_and_noise_from_a_stream() {
        let keys = keys_from(b"\x1b[Aw\x1b[Dx q");
        assert_eq!(
            keys,
            vec![
                KeyEvent::Up,
                KeyEvent::Up,
                KeyEvent::Left,
                KeyEvent::Other(b"x".to_vec()),
                KeyEvent::Space,
                KeyEvent::Quit,
            ]
        );
    }

    #[test]
    fn unknown_escape_sequence_is_returned_raw() {
        assert_eq!(keys_from(b"\x1b[Z"), vec![KeyEvent::Other(b"\x1b[Z".to_vec())]);
    }

    #[test]
    fn truncated_escape_sequence_is_returned_raw() {
        assert_eq!(keys_from(b"\x1b["), vec![KeyEvent::Other(b"\x1b[".to_vec())]);
    }

    #[test]
    fn multibyte_character_is_one_key() {
        assert_eq!(
            keys_from("ñd".as_bytes()),
            vec![KeyEvent::Other("ñ".as_bytes().to_vec()), KeyEvent::Right]
        );
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut capture = TermiosCapture::detached(Cursor::new(Vec::new()));
        assert!(matches!(capture.read_next_key(), Err(CaptureError::Closed)));
    }

    #[test]
    fn pipes_are_not_interactive() {
        let capture = TermiosCapture::detached(io::empty());
        assert!(!capture.is_interactive());
    }

    #[test]
    fn guard_restores_original_mode_on_drop() {
        let pty = openpty(None, None).expect("openpty");
        let before = termios::tcgetattr(pty.slave.as_fd()).unwrap();
        {
            let guard = TermiosGuard::engage(pty.slave.as_fd()).unwrap();
            let during = termios::tcgetattr(pty.slave.as_fd()).unwrap();
            assert!(!during.local_flags.contains(LocalFlags::ECHO));
            assert!(!during.local_flags.contains(LocalFlags::ICANON));
            guard.bound_reads(LOOKAHEAD_TIMEOUT_DS).unwrap();
        }
        let after = termios::tcgetattr(pty.slave.as_fd()).unwrap();
        assert_same_mode(&before, &after);
    }

    #[test]
    fn guard_restores_line_speed() {
        let pty = openpty(None, None).expect("openpty");
        let mut slow = termios::tcgetattr(pty.slave.as_fd()).unwrap();
        termios::cfsetspeed(&mut slow, BaudRate::B9600).unwrap();
        termios::tcsetattr(pty.slave.as_fd(), SetArg::TCSANOW, &slow).unwrap();
        let before = termios::tcgetattr(pty.slave.as_fd()).unwrap();

        drop(TermiosGuard::engage(pty.slave.as_fd()).unwrap());

        let after = termios::tcgetattr(pty.slave.as_fd()).unwrap();
        assert_same_mode(&before, &after);
    }

    #[test]
    fn guard_restores_original_mode_on_error_path() {
        fn fail_while_raw(fd: BorrowedFd<'_>) -> io::Result<()> {
            let _guard = TermiosGuard::engage(fd)?;
            Err(io::Error::other("device vanished"))
        }

        let pty = openpty(None, None).expect("openpty");
        let before = termios::tcgetattr(pty.slave.as_fd()).unwrap();
        assert!(fail_while_raw(pty.slave.as_fd()).is_err());
        let after = termios::tcgetattr(pty.slave.as_fd()).unwrap();
        assert_same_mode(&before, &after);
    }

    #[test]
    fn reads_arrow_from_terminal_and_restores_mode() {
        let pty = openpty(None, None).expect("openpty");
        let before = termios::tcgetattr(pty.slave.as_fd()).unwrap();
        let mut master = File::from(pty.master);
        let mut capture = TermiosCapture::new(File::from(pty.slave)).unwrap();
        assert!(capture.is_interactive());

        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            master.write_all(b"\x1b[B").unwrap();
            master
        });
        assert_eq!(capture.read_next_key().unwrap(), KeyEvent::Down);
        let _master = writer.join().unwrap();

        let after = termios::tcgetattr(capture.input.as_fd()).unwrap();
        assert_same_mode(&before, &after);
    }

    #[test]
    fn lone_escape_returns_after_lookahead_timeout() {
        let pty = openpty(None, None).expect("openpty");
        let mut master = File::from(pty.master);
        let mut capture = TermiosCapture::new(File::from(pty.slave)).unwrap();

        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            master.write_all(&[ESC]).unwrap();
            master
        });
        assert_eq!(capture.read_next_key().unwrap(), KeyEvent::Other(vec![ESC]));
        let _master = writer.join().unwrap();
    }
}
