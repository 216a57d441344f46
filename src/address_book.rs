//! The address book: an ordered list of unique persons.
//!
//! Uniqueness is by `Person::is_same_person`, so two entries can never share a
//! name (ignoring case). Every mutating operation checks that before touching
//! the list.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{BookError, ValidationError};
use crate::fields::*;
use crate::person::Person;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    persons: Vec<Person>,
}

impl AddressBook {
    /// Build a book from a list, rejecting duplicate persons.
    pub fn from_persons(persons: Vec<Person>) -> Result<Self, BookError> {
        let mut book = AddressBook::default();
        for p in persons {
            book.add_person(p)?;
        }
        Ok(book)
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn has_person(&self, person: &Person) -> bool {
        self.persons.iter().any(|p| p.is_same_person(person))
    }

    pub fn add_person(&mut self, person: Person) -> Result<(), BookError> {
        if self.has_person(&person) {
            return Err(BookError::DuplicatePerson);
        }
        self.persons.push(person);
        Ok(())
    }

    /// Replace `target` with `edited`, keeping its position in the list.
    pub fn set_person(&mut self, target: &Person, edited: Person) -> Result<(), BookError> {
        let idx = self
            .persons
            .iter()
            .position(|p| p == target)
            .ok_or(BookError::PersonNotFound)?;
        let clashes = self
            .persons
            .iter()
            .enumerate()
            .any(|(i, p)| i != idx && p.is_same_person(&edited));
        if clashes {
            return Err(BookError::DuplicatePerson);
        }
        self.persons[idx] = edited;
        Ok(())
    }

    pub fn remove_person(&mut self, target: &Person) -> Result<(), BookError> {
        let idx = self
            .persons
            .iter()
            .position(|p| p == target)
            .ok_or(BookError::PersonNotFound)?;
        self.persons.remove(idx);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.persons.clear();
    }

    /// Count how many persons carry each tag.
    pub fn tag_counts(&self) -> BTreeMap<Tag, usize> {
        let mut counts: BTreeMap<Tag, usize> = BTreeMap::new();
        for p in &self.persons {
            for tag in &p.tags {
                *counts.entry(tag.clone()).or_default() += 1;
            }
        }
        counts
    }

    /// Starter contacts written on first launch.
    pub fn sample() -> Self {
        let rows: [(&str, &str, &str, &str, &[&str]); 6] = [
            ("Alex Yeoh", "87438807", "alexyeoh@example.com", "Blk 30 Geylang Street 29, #06-40", &["friends"]),
            ("Bernice Yu", "99272758", "berniceyu@example.com", "Blk 30 Lorong 3 Serangoon Gardens, #07-18", &["colleagues", "friends"]),
            ("Charlotte Oliveiro", "93210283", "charlotte@example.com", "Blk 11 Ang Mo Kio Street 74, #11-04", &["neighbours"]),
            ("David Li", "91031282", "lidavid@example.com", "Blk 436 Serangoon Gardens Street 26, #16-43", &["family"]),
            ("Irfan Ibrahim", "92492021", "irfan@example.com", "Blk 47 Tampines Street 20, #17-35", &["classmates"]),
            ("Roy Balakrishnan", "92624417", "royb@example.com", "Blk 45 Aljunied Street 85, #11-31", &["colleagues"]),
        ];
        let persons = rows
            .iter()
            .filter_map(|(n, p, e, a, t)| sample_person(n, p, e, a, t).ok())
            .collect();
        AddressBook { persons }
    }
}

fn sample_person(
    name: &str,
    phone: &str,
    email: &str,
    address: &str,
    tags: &[&str],
) -> Result<Person, ValidationError> {
    let tags = tags.iter().map(|t| Tag::parse(t)).collect::<Result<BTreeSet<_>, _>>()?;
    Ok(Person::new(
        Name::parse(name)?,
        Phone::parse(phone)?,
        Email::parse(email)?,
        Address::parse(address)?,
        tags,
    ))
}
