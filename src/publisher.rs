//! The publish loop: keypresses in, latest command out.
//!
//! The loop has two states. It starts `Running` and only `quit` moves it to
//! `Terminated`. Every recognized command is a self-loop that writes the
//! mailbox; unrecognized keys are self-loops with no write. Pausing is just
//! another published command, interpreted by the game engine.

use std::io::{self, Write};

use colored::Colorize;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::capture::KeyCapture;
use crate::commands::{Action, Command};
use crate::db::Mailbox;
use crate::error::{CaptureError, MailboxError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Fatal conditions that end the loop early.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Mailbox(#[from] MailboxError),

    #[error("failed to write operator message: {0}")]
    Output(#[from] io::Error),
}

/// What happened over one run of the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Writes that reached the mailbox (including no-op writes).
    pub published: u64,
    /// Keys outside the command vocabulary.
    pub ignored: u64,
    /// Commands dropped because the mailbox table was missing.
    pub dropped: u64,
    pub last: Option<Command>,
}

pub struct Publisher<C, M, W = io::Stdout> {
    capture: C,
    mailbox: M,
    out: W,
    state: LoopState,
    summary: RunSummary,
}

impl<C: KeyCapture, M: Mailbox> Publisher<C, M> {
    /// Publisher that reports to standard output.
    pub fn new(capture: C, mailbox: M) -> Self {
        Self::with_output(capture, mailbox, io::stdout())
    }
}

impl<C: KeyCapture, M: Mailbox, W: Write> Publisher<C, M, W> {
    /// Publisher that writes operator messages (warnings) to `out`.
    pub fn with_output(capture: C, mailbox: M, out: W) -> Self {
        Self {
            capture,
            mailbox,
            out,
            state: LoopState::Running,
            summary: RunSummary::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Read one key and act on it.
    ///
    /// Once the loop is terminated this returns immediately without reading.
    pub fn step(&mut self) -> Result<LoopState, PublishError> {
        if self.state == LoopState::Terminated {
            return Ok(self.state);
        }

        let key = self.capture.read_next_key()?;
        match Action::from(&key) {
            Action::Quit => {
                debug!("Quit requested");
                self.state = LoopState::Terminated;
            }
            Action::Ignore => {
                trace!("Ignoring key {:?}", key);
                self.summary.ignored += 1;
            }
            Action::Publish(command) => self.publish(command)?,
        }
        Ok(self.state)
    }

    /// Run until `quit`, or until a fatal error.
    pub fn run(mut self) -> Result<RunSummary, PublishError> {
        while self.step()? == LoopState::Running {}
        info!(
            "Publisher stopped: {} published, {} ignored, {} dropped",
            self.summary.published, self.summary.ignored, self.summary.dropped
        );
        Ok(self.summary)
    }

    fn publish(&mut self, command: Command) -> Result<(), PublishError> {
        match self.mailbox.publish(command) {
            Ok(rows) => {
                debug!("Published '{}' ({} row(s))", command.code(), rows);
                self.summary.published += 1;
                self.summary.last = Some(command);
                Ok(())
            }
            Err(MailboxError::MissingTable(table)) => {
                warn!("Dropped '{}', table '{}' is missing", command.code(), table);
                self.summary.dropped += 1;
                writeln!(
                    self.out,
                    "{} table '{}' does not exist",
                    "Warning:".yellow().bold(),
                    table
                )?;
                self.out.flush()?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
