use colored::Colorize;
use std::io::{self, Write};

/// Print the keyboard controls shown once the mailbox is connected.
pub fn render_controls<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "{}", "Controls:".bold())?;
    writeln!(out, "  {:16} - move", "Arrow keys/WASD")?;
    writeln!(out, "  {:16} - hard drop", "Space")?;
    writeln!(out, "  {:16} - pause (move/hard drop to unpause)", "P")?;
    writeln!(out, "  {:16} - stop the input bridge", "Q")?;
    out.flush()
}
