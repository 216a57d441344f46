use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Keyboard-driven contact book.
/// Data lives under ~/.contacts/ unless --db points elsewhere.
#[derive(Parser)]
#[command(name = "cb", version, about = "Contact book with undo/redo and command history")]
pub struct Cli {
    /// Path to the address book JSON file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
