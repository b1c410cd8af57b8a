//! Key capture backends.
//!
//! Two interchangeable readers sit behind [`KeyCapture`]:
//! - [`TermiosCapture`] puts the terminal line discipline into raw mode and
//!   decodes the byte stream itself (unix only).
//! - [`ConsoleCapture`] reads one decoded key at a time from the crossterm
//!   console reader (any platform, the default on Windows).
//!
//! Both restore the terminal mode before returning, so the process never
//! leaves a raw terminal behind.

pub mod console;
#[cfg(unix)]
pub mod termios;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::error::CaptureError;
use crate::keys::KeyEvent;

pub use console::ConsoleCapture;
#[cfg(unix)]
pub use termios::TermiosCapture;

/// Blocking source of normalized keypresses.
pub trait KeyCapture {
    /// Block until exactly one logical keypress is available.
    fn read_next_key(&mut self) -> Result<KeyEvent, CaptureError>;
}

impl<K: KeyCapture + ?Sized> KeyCapture for Box<K> {
    fn read_next_key(&mut self) -> Result<KeyEvent, CaptureError> {
        (**self).read_next_key()
    }
}

impl<K: KeyCapture + ?Sized> KeyCapture for &mut K {
    fn read_next_key(&mut self) -> Result<KeyEvent, CaptureError> {
        (**self).read_next_key()
    }
}

/// Which capture backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Termios on unix, console everywhere else
    #[default]
    Auto,
    /// Raw termios line discipline with escape-sequence decoding
    Termios,
    /// Per-key console reads
    Console,
}

impl CaptureMode {
    /// Resolve `Auto` for the current host.
    pub fn resolve(self) -> CaptureMode {
        match self {
            CaptureMode::Auto if cfg!(unix) => CaptureMode::Termios,
            CaptureMode::Auto => CaptureMode::Console,
            explicit => explicit,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CaptureMode::Auto => "auto",
            CaptureMode::Termios => "termios",
            CaptureMode::Console => "console",
        }
    }
}

/// Build the capture backend for `mode` reading from standard input.
pub fn open(mode: CaptureMode) -> Result<Box<dyn KeyCapture>, CaptureError> {
    let resolved = mode.resolve();
    debug!("Using {} key capture", resolved.as_str());
    match resolved {
        CaptureMode::Auto | CaptureMode::Console => Ok(Box::new(ConsoleCapture::new())),
        #[cfg(unix)]
        CaptureMode::Termios => {
            let capture = TermiosCapture::stdin()?;
            if !capture.is_interactive() {
                debug!("Standard input is not a terminal, decoding it without raw mode");
            }
            Ok(Box::new(capture))
        }
        #[cfg(not(unix))]
        CaptureMode::Termios => Err(CaptureError::Unsupported("termios")),
    }
}
