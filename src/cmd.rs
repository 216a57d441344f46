//! Command implementations for the CLI interface.
//!
//! Each handler resolves the address book from `Settings`, then either hands
//! a `Logic` to the TUI or runs a single command line through it.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::{info, warn};

use crate::address_book::AddressBook;
use crate::config::Settings;
use crate::logic::Logic;
use crate::storage::{create_backup, load_address_book};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Execute one command, e.g. `cb run add n/Amy p/123 e/a@b.co a/Main St`.
    Run {
        /// The command line, split into words by the shell.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Create a timestamped backup of the address book file.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Load the book the settings point at.
///
/// A missing file starts from the sample contacts. A file that cannot be read
/// starts an empty book and leaves the file untouched until the next save.
pub fn load_logic(settings: &Settings) -> Logic {
    let path = &settings.book_path;
    let book = match load_address_book(path) {
        Ok(Some(book)) => {
            info!(path = %path.display(), persons = book.len(), "loaded address book");
            book
        }
        Ok(None) => {
            info!(path = %path.display(), "data file not found, starting with sample contacts");
            AddressBook::sample()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "data file could not be loaded, starting with an empty address book");
            AddressBook::default()
        }
    };
    Logic::new(book, path.clone(), settings.prefs.undo_limit)
}

/// Launch the TUI.
pub fn cmd_ui(settings: &Settings) -> Result<()> {
    let logic = load_logic(settings);
    run_tui(logic).context("UI error")
}

/// Run one command and print its feedback.
pub fn cmd_run(settings: &Settings, words: &[String]) -> Result<()> {
    let mut logic = load_logic(settings);
    let line = words.join(" ");
    let result = logic.execute(&line)?;
    println!("{}", result.feedback);
    Ok(())
}

/// Copy the address book file into its `backup/` directory.
pub fn cmd_backup(book_path: &Path) -> Result<()> {
    let backup = create_backup(book_path)
        .with_context(|| format!("Failed to create backup of {}", book_path.display()))?;
    println!("Backup created: {}", backup.display());
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
