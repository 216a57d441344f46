//! # cb - Contact Book
//!
//! A keyboard-driven contact manager. Every action is a typed command, run
//! either in the terminal user interface or in-line from the shell.
//!
//! ## Key Features
//!
//! - **Command language**: `add n/NAME p/PHONE e/EMAIL a/ADDRESS [t/TAG]...`,
//!   `edit`, `delete`, `tag`, `untag`, `find`, `filter`, `list`, `clear`
//! - **Undo/redo**: every change to the address book is a version that can be
//!   stepped back and forth
//! - **Command recall**: Up/Down in the command box walks previously entered lines
//! - **Export/import**: CSV or JSON, chosen by file extension
//! - **Local file storage**: `~/.contacts/data/contacts.json` with timestamped backups
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! cb
//!
//! # Add a contact without opening the UI
//! cb run add n/Amy Tan p/91234567 e/amy@example.com a/12 Main St t/friends
//!
//! # Back up the data file
//! cb backup
//! ```
//!
//! Configuration lives in `~/.contacts/config.json` and the preferences file
//! it names. Logs are written to `~/.contacts/logs/contacts.log`.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

pub mod address_book;
pub mod cli;
pub mod cmd;
pub mod command;
pub mod config;
pub mod error;
pub mod fields;
pub mod history;
pub mod logging;
pub mod logic;
pub mod model;
pub mod parser;
pub mod person;
pub mod storage;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{default_data_dir, Settings};

fn run(cli: Cli) -> Result<()> {
    let data_dir = default_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let settings = Settings::load(&data_dir, cli.config.as_deref(), cli.db.as_deref());
    // Held until `run` returns so the log file is flushed before exit.
    let _log_guard = match logging::init_tracing(&settings.data_dir, &settings.config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };
    info!(data_dir = %settings.data_dir.display(), book = %settings.book_path.display(), "starting");

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => cmd_ui(&settings),
        Commands::Run { words } => cmd_run(&settings, &words),
        Commands::Backup => cmd_backup(&settings.book_path),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
