//! Error types for the address book.
//!
//! Each layer has its own error enum so callers can tell a bad command
//! apart from a bad data file. All of them use thiserror; the binary edges
//! wrap them in `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

/// A field value failed its format constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Errors raised while turning user input into a `Command`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command")]
    UnknownCommand,

    #[error("Invalid command format!\n{usage}")]
    InvalidFormat { usage: String },

    #[error("Index is not a non-zero unsigned integer.")]
    InvalidIndex,

    #[error("At least one field to edit must be provided.")]
    NothingToEdit,

    #[error("Multiple values specified for the following single-valued field(s): {0}")]
    DuplicatePrefixes(String),

    #[error(transparent)]
    InvalidValue(#[from] ValidationError),
}

impl ParseError {
    pub fn format(usage: &str) -> Self {
        ParseError::InvalidFormat { usage: usage.to_string() }
    }
}

/// Errors raised by the address book itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("This person already exists in the address book")]
    DuplicatePerson,

    #[error("The person does not exist in the address book")]
    PersonNotFound,
}

/// Errors raised while executing a parsed command.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Book(#[from] BookError),

    #[error("The person index provided is invalid")]
    InvalidIndex,

    #[error("{0}")]
    Rejected(String),

    #[error("No more commands to undo!")]
    NothingToUndo,

    #[error("No more commands to redo!")]
    NothingToRedo,

    #[error("Could not save data to file: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised reading or writing files.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Illegal values found in {path}: {reason}")]
    DataConversion { path: PathBuf, reason: String },

    #[error("Unsupported file format '{0}'. Use a .csv or .json file")]
    UnsupportedFormat(String),
}

/// Errors raised loading configuration or preferences.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine home directory")]
    NoHomeDir,
}
