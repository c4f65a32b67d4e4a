//! Catpoint CLI - control panel for the home security system.
//!
//! ```text
//! main() -> CatpointSettings::load() -> flags override -> Session::open()
//!                                                          |
//!                                         Action (one shot) | shell loop
//! ```
//!
//! State persists between invocations in the store file; the cat-detected
//! flag does not, so `shell` is the way to exercise cat rules end to end.

mod display;
mod listener;
mod session;

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use catpoint_config::{CatpointSettings, ClassifierMode, log_paths};

use crate::display::Palette;
use crate::session::{Action, Session};

#[derive(Debug, Parser)]
#[command(name = "catpoint", version)]
#[command(about = "Arm, disarm and monitor the Catpoint home security system")]
struct Cli {
    /// State file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Classifier answer: random, cat or no-cat
    #[arg(long, global = true, value_name = "MODE")]
    classifier: Option<ClassifierMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Action(Action),
    /// Start an interactive session
    Shell,
}

/// Send `tracing` output to the first log file from [`log_paths`] that opens.
///
/// Without one no subscriber is installed, so logs never mix into command
/// output. `RUST_LOG` overrides the default `info` filter.
fn init_tracing() {
    let mut failures = Vec::new();
    let opened = log_paths()
        .into_iter()
        .find_map(|path| match open_for_append(&path) {
            Ok(file) => Some((path, file)),
            Err(err) => {
                failures.push(format!("cannot log to {}: {err}", path.display()));
                None
            }
        });
    let Some((path, file)) = opened else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(filter)
        .init();

    tracing::info!(path = %path.display(), "Logging initialized");
    for failure in failures {
        tracing::warn!("{failure}");
    }
}

fn open_for_append(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut settings = CatpointSettings::load();
    if let Some(state) = cli.state {
        settings.store.path = state;
    }
    if let Some(mode) = cli.classifier {
        settings.classifier = mode;
    }

    let session = Session::open(&settings, Palette::detect());
    match cli.command {
        Command::Action(action) => session.run(action),
        Command::Shell => session.shell(io::stdin().lock()),
    }
}
