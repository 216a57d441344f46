//! In-memory state the commands operate on.
//!
//! The `Model` owns a `VersionedStack<AddressBook>` and the filter deciding
//! which persons are on display. Indices typed by the user always refer to
//! the displayed list.

use std::collections::BTreeSet;

use crate::address_book::AddressBook;
use crate::error::CommandError;
use crate::fields::Tag;
use crate::history::VersionedStack;
use crate::parser::Index;
use crate::person::Person;

/// Predicate selecting which persons are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PersonFilter {
    #[default]
    All,
    /// Any keyword matches a whole word of the name, ignoring case.
    NameKeywords(Vec<String>),
    /// The person carries every listed tag.
    Tags(BTreeSet<Tag>),
}

impl PersonFilter {
    pub fn matches(&self, person: &Person) -> bool {
        match self {
            PersonFilter::All => true,
            PersonFilter::NameKeywords(keywords) => keywords.iter().any(|k| person.name.has_word(k)),
            PersonFilter::Tags(tags) => person.has_all_tags(tags),
        }
    }
}

#[derive(Debug)]
pub struct Model {
    versions: VersionedStack<AddressBook>,
    filter: PersonFilter,
}

impl Model {
    pub fn new(book: AddressBook) -> Self {
        Model { versions: VersionedStack::new(book), filter: PersonFilter::All }
    }

    /// Model that keeps at most `undo_limit` undoable steps.
    pub fn with_undo_limit(book: AddressBook, undo_limit: usize) -> Self {
        Model {
            versions: VersionedStack::with_capacity_limit(book, undo_limit),
            filter: PersonFilter::All,
        }
    }

    pub fn address_book(&self) -> &AddressBook {
        self.versions.current()
    }

    pub fn update_filter(&mut self, filter: PersonFilter) {
        self.filter = filter;
    }

    pub fn filtered_persons(&self) -> Vec<&Person> {
        self.address_book()
            .persons()
            .iter()
            .filter(|p| self.filter.matches(p))
            .collect()
    }

    /// Person at a 1-based position in the displayed list.
    pub fn person_at(&self, index: Index) -> Result<&Person, CommandError> {
        self.filtered_persons()
            .get(index.zero_based())
            .copied()
            .ok_or(CommandError::InvalidIndex)
    }

    /// Apply `f` to a working copy of the current book.
    ///
    /// The copy becomes a new version only when `f` succeeds and actually
    /// changed something; otherwise history is left untouched.
    pub fn modify<R, E, F>(&mut self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut AddressBook) -> Result<R, E>,
    {
        let mut working = self.versions.current().clone();
        let out = f(&mut working)?;
        if &working != self.versions.current() {
            self.versions.commit(working);
        }
        Ok(out)
    }

    pub fn can_undo(&self) -> bool {
        self.versions.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.versions.can_redo()
    }

    /// Step back one version and show everyone.
    pub fn undo(&mut self) -> bool {
        let moved = self.versions.undo().is_some();
        if moved {
            self.filter = PersonFilter::All;
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.versions.redo().is_some();
        if moved {
            self.filter = PersonFilter::All;
        }
        moved
    }
}
