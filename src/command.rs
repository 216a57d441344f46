//! Executable commands.
//!
//! `parser::parse_command` produces a `Command`; `Command::execute` applies it
//! to the `Model`. Every mutation goes through `Model::modify`, so a command
//! that changes the book produces exactly one undoable version.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::info;

use crate::error::{CommandError, StorageError};
use crate::fields::*;
use crate::history::InputHistory;
use crate::model::{Model, PersonFilter};
use crate::parser::Index;
use crate::person::Person;
use crate::storage::{export_persons, import_persons};

pub const ADD_WORD: &str = "add";
pub const DELETE_WORD: &str = "delete";
pub const EDIT_WORD: &str = "edit";
pub const TAG_WORD: &str = "tag";
pub const UNTAG_WORD: &str = "untag";
pub const FIND_WORD: &str = "find";
pub const FILTER_WORD: &str = "filter";
pub const LIST_WORD: &str = "list";
pub const CLEAR_WORD: &str = "clear";
pub const UNDO_WORD: &str = "undo";
pub const REDO_WORD: &str = "redo";
pub const HISTORY_WORD: &str = "history";
pub const EXPORT_WORD: &str = "export";
pub const IMPORT_WORD: &str = "import";
pub const HELP_WORD: &str = "help";
pub const EXIT_WORD: &str = "exit";

pub const ADD_USAGE: &str = "add: Adds a person to the address book. \
    Parameters: n/NAME p/PHONE e/EMAIL a/ADDRESS [t/TAG]...\n\
    Example: add n/John Doe p/98765432 e/johnd@example.com a/311, Clementi Ave 2, #02-25 t/friends";
pub const DELETE_USAGE: &str = "delete: Deletes the person identified by the index number used in the displayed person list.\n\
    Parameters: INDEX (must be a positive integer)\n\
    Example: delete 1";
pub const EDIT_USAGE: &str = "edit: Edits the details of the person identified by the index number used in the displayed person list. \
    Existing values will be overwritten by the input values; t/ on its own removes all tags.\n\
    Parameters: INDEX (must be a positive integer) [n/NAME] [p/PHONE] [e/EMAIL] [a/ADDRESS] [t/TAG]...\n\
    Example: edit 1 p/91234567 e/johndoe@example.com";
pub const TAG_USAGE: &str = "tag: Adds tags to the person identified by the index number used in the displayed person list.\n\
    Parameters: INDEX (must be a positive integer) t/TAG [t/TAG]...\n\
    Example: tag 1 t/friends t/gym";
pub const UNTAG_USAGE: &str = "untag: Removes tags from the person identified by the index number used in the displayed person list.\n\
    Parameters: INDEX (must be a positive integer) t/TAG [t/TAG]...\n\
    Example: untag 1 t/gym";
pub const FIND_USAGE: &str = "find: Finds all persons whose names contain any of the specified keywords (case-insensitive) \
    and displays them as a list with index numbers.\n\
    Parameters: KEYWORD [MORE_KEYWORDS]...\n\
    Example: find alice bob charlie";
pub const FILTER_USAGE: &str = "filter: Displays all persons carrying every one of the specified tags.\n\
    Parameters: t/TAG [t/TAG]...\n\
    Example: filter t/friends t/colleagues";
pub const EXPORT_USAGE: &str = "export: Writes the displayed persons to a .csv or .json file.\n\
    Parameters: f/PATH\n\
    Example: export f/contacts.csv";
pub const IMPORT_USAGE: &str = "import: Adds the persons in a .csv or .json file, skipping any already in the address book.\n\
    Parameters: f/PATH\n\
    Example: import f/contacts.csv";
pub const HELP_USAGE: &str = "help: Shows program usage instructions.\n\
    Example: help";

/// All usage lines, in the order the help screen shows them.
pub const ALL_USAGES: &[&str] = &[
    ADD_USAGE,
    DELETE_USAGE,
    EDIT_USAGE,
    TAG_USAGE,
    UNTAG_USAGE,
    FIND_USAGE,
    FILTER_USAGE,
    "list: Lists all persons.",
    "clear: Removes every person from the address book.",
    "undo: Reverts the last change to the address book.",
    "redo: Reapplies the last undone change.",
    "history: Lists the commands entered this session, most recent first.",
    EXPORT_USAGE,
    IMPORT_USAGE,
    HELP_USAGE,
    "exit: Exits the program.",
];

/// Fields to overwrite when editing a person. `None` keeps the old value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPersonDescriptor {
    pub name: Option<Name>,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub address: Option<Address>,
    pub tags: Option<BTreeSet<Tag>>,
}

impl EditPersonDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some()
            || self.phone.is_some()
            || self.email.is_some()
            || self.address.is_some()
            || self.tags.is_some()
    }

    pub fn apply(&self, original: &Person) -> Person {
        Person {
            name: self.name.clone().unwrap_or_else(|| original.name.clone()),
            phone: self.phone.clone().unwrap_or_else(|| original.phone.clone()),
            email: self.email.clone().unwrap_or_else(|| original.email.clone()),
            address: self.address.clone().unwrap_or_else(|| original.address.clone()),
            tags: self.tags.clone().unwrap_or_else(|| original.tags.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Person),
    Delete(Index),
    Edit { index: Index, descriptor: EditPersonDescriptor },
    Tag { index: Index, tags: BTreeSet<Tag> },
    Untag { index: Index, tags: BTreeSet<Tag> },
    Find(Vec<String>),
    Filter(BTreeSet<Tag>),
    List,
    Clear,
    Undo,
    Redo,
    History,
    Export(PathBuf),
    Import(PathBuf),
    Help,
    Exit,
}

/// Outcome of a successful command, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub feedback: String,
    pub show_help: bool,
    pub exit: bool,
}

impl CommandResult {
    pub fn message(feedback: impl Into<String>) -> Self {
        CommandResult { feedback: feedback.into(), show_help: false, exit: false }
    }
}

impl Command {
    /// Whether the command may change the address book.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Add(_)
                | Command::Delete(_)
                | Command::Edit { .. }
                | Command::Tag { .. }
                | Command::Untag { .. }
                | Command::Clear
                | Command::Import(_)
                | Command::Undo
                | Command::Redo
        )
    }

    pub fn execute(&self, model: &mut Model, history: &InputHistory) -> Result<CommandResult, CommandError> {
        match self {
            Command::Add(person) => {
                model.modify(|book| book.add_person(person.clone()))?;
                Ok(CommandResult::message(format!("New person added: {}", person)))
            }

            Command::Delete(index) => {
                let target = model.person_at(*index)?.clone();
                model.modify(|book| book.remove_person(&target))?;
                Ok(CommandResult::message(format!("Deleted Person: {}", target)))
            }

            Command::Edit { index, descriptor } => {
                let target = model.person_at(*index)?.clone();
                let edited = descriptor.apply(&target);
                model.modify(|book| book.set_person(&target, edited.clone()))?;
                model.update_filter(PersonFilter::All);
                Ok(CommandResult::message(format!("Edited Person: {}", edited)))
            }

            Command::Tag { index, tags } => {
                let target = model.person_at(*index)?.clone();
                if tags.is_subset(&target.tags) {
                    return Err(CommandError::Rejected("No new tags to add".into()));
                }
                let mut edited = target.clone();
                edited.tags.extend(tags.iter().cloned());
                model.modify(|book| book.set_person(&target, edited.clone()))?;
                Ok(CommandResult::message(format!("Tagged Person: {}", edited)))
            }

            Command::Untag { index, tags } => {
                let target = model.person_at(*index)?.clone();
                if target.tags.is_disjoint(tags) {
                    return Err(CommandError::Rejected("Person has none of the given tags".into()));
                }
                let mut edited = target.clone();
                edited.tags.retain(|t| !tags.contains(t));
                model.modify(|book| book.set_person(&target, edited.clone()))?;
                Ok(CommandResult::message(format!("Untagged Person: {}", edited)))
            }

            Command::Find(keywords) => {
                model.update_filter(PersonFilter::NameKeywords(keywords.clone()));
                Ok(listed(model))
            }

            Command::Filter(tags) => {
                model.update_filter(PersonFilter::Tags(tags.clone()));
                Ok(listed(model))
            }

            Command::List => {
                model.update_filter(PersonFilter::All);
                Ok(listed(model))
            }

            Command::Clear => {
                model.modify(|book| -> Result<(), CommandError> {
                    book.clear();
                    Ok(())
                })?;
                Ok(CommandResult::message("Address book has been cleared!"))
            }

            Command::Undo => {
                if !model.undo() {
                    return Err(CommandError::NothingToUndo);
                }
                Ok(CommandResult::message("Undo success!"))
            }

            Command::Redo => {
                if !model.redo() {
                    return Err(CommandError::NothingToRedo);
                }
                Ok(CommandResult::message("Redo success!"))
            }

            Command::History => {
                let entries = history.entries();
                if entries.is_empty() {
                    return Ok(CommandResult::message("You have not yet entered any commands."));
                }
                let lines: Vec<&str> = entries.iter().rev().map(String::as_str).collect();
                Ok(CommandResult::message(format!(
                    "Entered commands (from most recent to earliest):\n{}",
                    lines.join("\n")
                )))
            }

            Command::Export(path) => {
                let persons = model.filtered_persons();
                let count = persons.len();
                export_persons(&persons, path).map_err(|e| file_error("export to", path, e))?;
                info!(count, path = %path.display(), "exported persons");
                Ok(CommandResult::message(format!("Exported {} person(s) to {}", count, path.display())))
            }

            Command::Import(path) => {
                let incoming = import_persons(path).map_err(|e| file_error("import from", path, e))?;
                let total = incoming.len();
                let added = model.modify(|book| -> Result<usize, CommandError> {
                    let mut added = 0;
                    for person in incoming {
                        if !book.has_person(&person) {
                            book.add_person(person)?;
                            added += 1;
                        }
                    }
                    Ok(added)
                })?;
                model.update_filter(PersonFilter::All);
                info!(added, skipped = total - added, path = %path.display(), "imported persons");
                Ok(CommandResult::message(format!(
                    "Imported {} person(s) from {}, skipped {} already present",
                    added,
                    path.display(),
                    total - added
                )))
            }

            Command::Help => Ok(CommandResult {
                feedback: "Opened help window.".into(),
                show_help: true,
                exit: false,
            }),

            Command::Exit => Ok(CommandResult {
                feedback: "Exiting address book as requested ...".into(),
                show_help: false,
                exit: true,
            }),
        }
    }
}

fn listed(model: &Model) -> CommandResult {
    CommandResult::message(format!("{} persons listed!", model.filtered_persons().len()))
}

fn file_error(action: &str, path: &std::path::Path, err: StorageError) -> CommandError {
    CommandError::Rejected(format!("Could not {} {}: {}", action, path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_book::AddressBook;
    use crate::error::BookError;
    use crate::parser::parse_command;
    use crate::person::person;

    fn model() -> Model {
        Model::new(
            AddressBook::from_persons(vec![
                person("Alice Pauline", "94351253", "alice@example.com", "123 Jurong West", &["friends"]),
                person("Benson Meier", "98765432", "johnd@example.com", "311 Clementi Ave 2", &["owesMoney", "friends"]),
                person("Carl Kurz", "95352563", "heinz@example.com", "wall street", &[]),
            ])
            .unwrap(),
        )
    }

    fn run(model: &mut Model, line: &str) -> Result<CommandResult, CommandError> {
        parse_command(line)?.execute(model, &InputHistory::new())
    }

    #[test]
    fn test_add_then_duplicate() {
        let mut m = model();
        let res = run(&mut m, "add n/Daniel Meier p/87652533 e/cornelia@example.com a/10th street").unwrap();
        assert!(res.feedback.starts_with("New person added: Daniel Meier"));
        assert_eq!(m.address_book().len(), 4);

        let err = run(&mut m, "add n/daniel meier p/111 e/d@example.com a/x").unwrap_err();
        assert!(matches!(err, CommandError::Book(BookError::DuplicatePerson)));
        assert_eq!(m.address_book().len(), 4);
    }

    #[test]
    fn test_delete_uses_filtered_index() {
        let mut m = model();
        run(&mut m, "find carl").unwrap();
        let res = run(&mut m, "delete 1").unwrap();
        assert!(res.feedback.starts_with("Deleted Person: Carl Kurz"));
        assert!(matches!(run(&mut m, "delete 5"), Err(CommandError::InvalidIndex)));
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() {
        let mut m = model();
        run(&mut m, "edit 2 p/91234567 t/").unwrap();
        let benson = &m.address_book().persons()[1];
        assert_eq!(benson.phone.as_str(), "91234567");
        assert_eq!(benson.email.as_str(), "johnd@example.com");
        assert!(benson.tags.is_empty());
    }

    #[test]
    fn test_edit_into_existing_name_fails() {
        let mut m = model();
        let err = run(&mut m, "edit 1 n/Carl Kurz").unwrap_err();
        assert!(matches!(err, CommandError::Book(BookError::DuplicatePerson)));
    }

    #[test]
    fn test_tag_and_untag() {
        let mut m = model();
        run(&mut m, "tag 3 t/gym t/neighbours").unwrap();
        assert_eq!(m.address_book().persons()[2].tags.len(), 2);
        let err = run(&mut m, "tag 3 t/gym").unwrap_err();
        assert_eq!(err.to_string(), "No new tags to add");

        run(&mut m, "untag 3 t/gym t/unknown").unwrap();
        assert_eq!(m.address_book().persons()[2].tags.len(), 1);
        let err = run(&mut m, "untag 3 t/gym").unwrap_err();
        assert_eq!(err.to_string(), "Person has none of the given tags");
    }

    #[test]
    fn test_find_filter_list() {
        let mut m = model();
        assert_eq!(run(&mut m, "find meier kurz").unwrap().feedback, "2 persons listed!");
        assert_eq!(run(&mut m, "filter t/friends t/owesMoney").unwrap().feedback, "1 persons listed!");
        assert_eq!(run(&mut m, "list").unwrap().feedback, "3 persons listed!");
        assert_eq!(m.filtered_persons().len(), 3);
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut m = model();
        assert!(matches!(run(&mut m, "undo"), Err(CommandError::NothingToUndo)));
        run(&mut m, "delete 1").unwrap();
        run(&mut m, "clear").unwrap();
        assert!(m.address_book().is_empty());

        assert_eq!(run(&mut m, "undo").unwrap().feedback, "Undo success!");
        assert_eq!(m.address_book().len(), 2);
        run(&mut m, "undo").unwrap();
        assert_eq!(m.address_book().len(), 3);
        assert_eq!(run(&mut m, "redo").unwrap().feedback, "Redo success!");
        assert_eq!(m.address_book().len(), 2);

        // A new change discards the redo branch.
        run(&mut m, "delete 1").unwrap();
        assert!(matches!(run(&mut m, "redo"), Err(CommandError::NothingToRedo)));
    }

    #[test]
    fn test_clear_empty_book_is_not_a_version() {
        let mut m = Model::new(AddressBook::default());
        run(&mut m, "clear").unwrap();
        assert!(!m.can_undo());
    }

    #[test]
    fn test_filter_does_not_create_versions() {
        let mut m = model();
        run(&mut m, "find alice").unwrap();
        run(&mut m, "list").unwrap();
        assert!(!m.can_undo());
    }

    #[test]
    fn test_history_lists_newest_first() {
        let mut m = model();
        let mut history = InputHistory::new();
        let res = Command::History.execute(&mut m, &history).unwrap();
        assert_eq!(res.feedback, "You have not yet entered any commands.");

        history.record("list");
        history.record("find alice");
        let res = Command::History.execute(&mut m, &history).unwrap();
        assert_eq!(res.feedback, "Entered commands (from most recent to earliest):\nfind alice\nlist");
    }

    #[test]
    fn test_export_then_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friends.csv");
        let mut m = model();
        run(&mut m, "filter t/friends").unwrap();
        let res = run(&mut m, &format!("export f/{}", path.display())).unwrap();
        assert!(res.feedback.starts_with("Exported 2 person(s)"));

        let mut fresh = Model::new(AddressBook::from_persons(vec![m.address_book().persons()[0].clone()]).unwrap());
        let res = run(&mut fresh, &format!("import f/{}", path.display())).unwrap();
        assert!(res.feedback.starts_with("Imported 1 person(s)"));
        assert!(res.feedback.ends_with("skipped 1 already present"));
        assert_eq!(fresh.address_book().len(), 2);

        run(&mut fresh, "undo").unwrap();
        assert_eq!(fresh.address_book().len(), 1);
    }

    #[test]
    fn test_import_skips_repeats_within_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repeats.csv");
        std::fs::write(
            &path,
            "name,phone,email,address,tags\n\
             Zed Ong,81112222,zed@example.com,1 Bay Road,\n\
             zed ong,83334444,zed2@example.com,2 Bay Road,gym\n",
        )
        .unwrap();
        let mut m = model();
        let res = run(&mut m, &format!("import f/{}", path.display())).unwrap();
        assert!(res.feedback.starts_with("Imported 1 person(s)"));
        assert!(res.feedback.ends_with("skipped 1 already present"));
        assert_eq!(m.address_book().len(), 4);
        assert_eq!(m.address_book().persons()[3].phone.as_str(), "81112222");
    }

    #[test]
    fn test_invalid_json_import_adds_nobody() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.json");
        std::fs::write(
            &path,
            r#"{"persons":[
                {"name":"Zed Ong","phone":"81112222","email":"zed@example.com","address":"1 Bay Road"},
                {"name":"Yan Ho","phone":"not-a-phone","email":"yan@example.com","address":"2 Bay Road"}
            ]}"#,
        )
        .unwrap();
        let mut m = model();
        let err = run(&mut m, &format!("import f/{}", path.display())).unwrap_err();
        assert!(err.to_string().starts_with("Could not import from"));
        assert_eq!(m.address_book().len(), 3);
        assert!(!m.can_undo());
    }

    #[test]
    fn test_import_missing_file() {
        let mut m = model();
        let err = run(&mut m, "import f/does/not/exist.json").unwrap_err();
        assert!(err.to_string().starts_with("Could not import from"));
        assert!(!m.can_undo());
    }

    #[test]
    fn test_help_and_exit_flags() {
        let mut m = model();
        assert!(run(&mut m, "help").unwrap().show_help);
        assert!(run(&mut m, "exit").unwrap().exit);
    }
}
