//! The command pipeline shared by the TUI and `cb run`.
//!
//! `Logic::execute` parses a line, runs it against the model, records it in
//! the input history and saves the book whenever it changed.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::address_book::AddressBook;
use crate::command::CommandResult;
use crate::error::CommandError;
use crate::history::InputHistory;
use crate::model::Model;
use crate::parser::parse_command;
use crate::person::Person;
use crate::storage::save_address_book;

pub struct Logic {
    model: Model,
    input_history: InputHistory,
    book_path: PathBuf,
}

impl Logic {
    pub fn new(book: AddressBook, book_path: PathBuf, undo_limit: usize) -> Self {
        Logic {
            model: Model::with_undo_limit(book, undo_limit),
            input_history: InputHistory::new(),
            book_path,
        }
    }

    pub fn execute(&mut self, line: &str) -> Result<CommandResult, CommandError> {
        info!(command = line.trim(), "executing");
        let result = self.run(line);
        self.input_history.record(line);
        if let Err(e) = &result {
            warn!(error = %e, "command failed");
        }
        result
    }

    fn run(&mut self, line: &str) -> Result<CommandResult, CommandError> {
        let command = parse_command(line)?;
        if !command.is_mutating() {
            return command.execute(&mut self.model, &self.input_history);
        }
        let before = self.model.address_book().clone();
        let result = command.execute(&mut self.model, &self.input_history)?;
        if self.model.address_book() != &before {
            save_address_book(self.model.address_book(), &self.book_path)?;
        }
        Ok(result)
    }

    pub fn address_book(&self) -> &AddressBook {
        self.model.address_book()
    }

    pub fn filtered_persons(&self) -> Vec<&Person> {
        self.model.filtered_persons()
    }

    pub fn input_history_mut(&mut self) -> &mut InputHistory {
        &mut self.input_history
    }

    pub fn book_path(&self) -> &Path {
        &self.book_path
    }
}
