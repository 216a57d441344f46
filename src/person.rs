//! Contact record.
//!
//! A `Person` bundles the validated fields from `fields` with a set of tags.
//! Two records describe the same person when their names match ignoring case,
//! which is weaker than full equality and is what the duplicate check uses.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: Name,
    pub phone: Phone,
    pub email: Email,
    pub address: Address,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
}

impl Person {
    pub fn new(name: Name, phone: Phone, email: Email, address: Address, tags: BTreeSet<Tag>) -> Self {
        Person { name, phone, email, address, tags }
    }

    /// Identity check used to keep the address book free of duplicates.
    pub fn is_same_person(&self, other: &Person) -> bool {
        self.name.same_as(&other.name)
    }

    pub fn has_all_tags(&self, tags: &BTreeSet<Tag>) -> bool {
        tags.is_subset(&self.tags)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; Phone: {}; Email: {}; Address: {}; Tags: ",
            self.name, self.phone, self.email, self.address
        )?;
        for tag in &self.tags {
            write!(f, "[{}]", tag)?;
        }
        Ok(())
    }
}

/// Build a person from raw strings, panicking on invalid input.
#[cfg(test)]
pub fn person(name: &str, phone: &str, email: &str, address: &str, tags: &[&str]) -> Person {
    Person {
        name: Name::parse(name).unwrap(),
        phone: Phone::parse(phone).unwrap(),
        email: Email::parse(email).unwrap(),
        address: Address::parse(address).unwrap(),
        tags: tags.iter().map(|t| Tag::parse(t).unwrap()).collect(),
    }
}
