mod cli;

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use input_bridge::config::Settings;
use input_bridge::publisher::Publisher;
use input_bridge::{capture, db};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so they never interleave with the operator output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply_to(&mut settings);
    settings.validate()?;

    let mut stdout = io::stdout();
    print!("Connecting to {} ... ", settings.database.target());
    stdout.flush()?;
    let mailbox = match db::connect(&settings.database) {
        Ok(mailbox) => {
            println!("{}", "connected.".green());
            mailbox
        }
        Err(err) => {
            println!();
            return Err(err).context("Connection failed");
        }
    };

    let capture = capture::open(settings.capture.mode).context("Failed to open keyboard input")?;
    cli::help::render_controls(&mut stdout)?;

    let summary = Publisher::new(capture, mailbox).run()?;
    info!(
        "Stopped after {} command(s), last: {}",
        summary.published,
        summary.last.map_or("none", |c| c.name())
    );
    Ok(())
}
