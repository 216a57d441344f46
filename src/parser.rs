//! Command-line parsing.
//!
//! A command line is a command word followed by arguments. Arguments are a
//! free-text preamble followed by prefixed values such as `n/John Doe p/123`.
//! A prefix only counts when it starts the argument string or follows
//! whitespace, so `a/12 Main St/2` keeps its inner slash.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use tracing::debug;

use crate::command::*;
use crate::error::ParseError;
use crate::fields::*;
use crate::person::Person;

pub const PREFIX_NAME: &str = "n/";
pub const PREFIX_PHONE: &str = "p/";
pub const PREFIX_EMAIL: &str = "e/";
pub const PREFIX_ADDRESS: &str = "a/";
pub const PREFIX_TAG: &str = "t/";
pub const PREFIX_FILE: &str = "f/";

/// A position in the displayed person list. Stored zero-based, shown one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index(usize);

impl Index {
    pub fn from_one_based(n: usize) -> Option<Self> {
        n.checked_sub(1).map(Index)
    }

    pub fn zero_based(self) -> usize {
        self.0
    }

    pub fn one_based(self) -> usize {
        self.0 + 1
    }
}

/// Values collected by `tokenize`, keyed by prefix.
#[derive(Debug, Default)]
pub struct ArgumentMultimap {
    preamble: String,
    values: HashMap<&'static str, Vec<String>>,
}

impl ArgumentMultimap {
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// The last value given for `prefix`.
    pub fn value(&self, prefix: &str) -> Option<&str> {
        self.values.get(prefix).and_then(|v| v.last()).map(String::as_str)
    }

    pub fn all_values(&self, prefix: &str) -> &[String] {
        self.values.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, prefix: &str) -> bool {
        self.values.contains_key(prefix)
    }

    /// Fail if any of `prefixes` was given more than once.
    pub fn verify_no_duplicates(&self, prefixes: &[&str]) -> Result<(), ParseError> {
        let dups: Vec<&str> = prefixes
            .iter()
            .copied()
            .filter(|p| self.all_values(p).len() > 1)
            .collect();
        if dups.is_empty() {
            Ok(())
        } else {
            Err(ParseError::DuplicatePrefixes(dups.join(" ")))
        }
    }
}

/// Split `args` on the given prefixes.
pub fn tokenize(args: &str, prefixes: &[&'static str]) -> ArgumentMultimap {
    let mut positions: Vec<(usize, &'static str)> = Vec::new();
    for &prefix in prefixes {
        for (i, _) in args.match_indices(prefix) {
            let at_boundary = i == 0 || args[..i].chars().next_back().is_some_and(char::is_whitespace);
            if at_boundary {
                positions.push((i, prefix));
            }
        }
    }
    positions.sort_by_key(|&(i, _)| i);

    let mut map = ArgumentMultimap::default();
    let preamble_end = positions.first().map(|&(i, _)| i).unwrap_or(args.len());
    map.preamble = args[..preamble_end].trim().to_string();

    for (n, &(start, prefix)) in positions.iter().enumerate() {
        let value_start = start + prefix.len();
        let value_end = positions.get(n + 1).map(|&(i, _)| i).unwrap_or(args.len());
        let value = args[value_start..value_end].trim().to_string();
        map.values.entry(prefix).or_default().push(value);
    }
    map
}

/// Parse a 1-based index. Signs and other decoration are rejected.
pub fn parse_index(raw: &str) -> Result<Index, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::InvalidIndex);
    }
    raw.parse::<usize>()
        .ok()
        .and_then(Index::from_one_based)
        .ok_or(ParseError::InvalidIndex)
}

fn parse_tags(values: &[String]) -> Result<BTreeSet<Tag>, ParseError> {
    values
        .iter()
        .map(|v| Tag::parse(v).map_err(ParseError::from))
        .collect()
}

/// Parse a full command line into a `Command`.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseError::format(HELP_USAGE));
    }
    let (word, args) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
    debug!(command_word = word, "parsing command");

    match word {
        ADD_WORD => parse_add(args),
        DELETE_WORD => parse_delete(args),
        EDIT_WORD => parse_edit(args),
        TAG_WORD => parse_tag(args, TAG_USAGE).map(|(index, tags)| Command::Tag { index, tags }),
        UNTAG_WORD => parse_tag(args, UNTAG_USAGE).map(|(index, tags)| Command::Untag { index, tags }),
        FIND_WORD => parse_find(args),
        FILTER_WORD => parse_filter(args),
        EXPORT_WORD => parse_file(args, EXPORT_USAGE).map(Command::Export),
        IMPORT_WORD => parse_file(args, IMPORT_USAGE).map(Command::Import),
        LIST_WORD => Ok(Command::List),
        CLEAR_WORD => Ok(Command::Clear),
        UNDO_WORD => Ok(Command::Undo),
        REDO_WORD => Ok(Command::Redo),
        HISTORY_WORD => Ok(Command::History),
        HELP_WORD => Ok(Command::Help),
        EXIT_WORD => Ok(Command::Exit),
        _ => Err(ParseError::UnknownCommand),
    }
}

fn parse_add(args: &str) -> Result<Command, ParseError> {
    let map = tokenize(args, &[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS, PREFIX_TAG]);
    let required = [PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS];
    if !map.preamble().is_empty() || !required.iter().all(|p| map.has(p)) {
        return Err(ParseError::format(ADD_USAGE));
    }
    map.verify_no_duplicates(&required)?;

    let person = Person::new(
        Name::parse(map.value(PREFIX_NAME).unwrap_or_default())?,
        Phone::parse(map.value(PREFIX_PHONE).unwrap_or_default())?,
        Email::parse(map.value(PREFIX_EMAIL).unwrap_or_default())?,
        Address::parse(map.value(PREFIX_ADDRESS).unwrap_or_default())?,
        parse_tags(map.all_values(PREFIX_TAG))?,
    );
    Ok(Command::Add(person))
}

fn parse_delete(args: &str) -> Result<Command, ParseError> {
    parse_index(args)
        .map(Command::Delete)
        .map_err(|_| ParseError::format(DELETE_USAGE))
}

fn parse_edit(args: &str) -> Result<Command, ParseError> {
    let map = tokenize(args, &[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS, PREFIX_TAG]);
    let index = parse_index(map.preamble()).map_err(|_| ParseError::format(EDIT_USAGE))?;
    map.verify_no_duplicates(&[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS])?;

    let mut descriptor = EditPersonDescriptor::default();
    if let Some(v) = map.value(PREFIX_NAME) {
        descriptor.name = Some(Name::parse(v)?);
    }
    if let Some(v) = map.value(PREFIX_PHONE) {
        descriptor.phone = Some(Phone::parse(v)?);
    }
    if let Some(v) = map.value(PREFIX_EMAIL) {
        descriptor.email = Some(Email::parse(v)?);
    }
    if let Some(v) = map.value(PREFIX_ADDRESS) {
        descriptor.address = Some(Address::parse(v)?);
    }
    let tag_values = map.all_values(PREFIX_TAG);
    if !tag_values.is_empty() {
        // A single empty `t/` clears every tag.
        descriptor.tags = if tag_values.len() == 1 && tag_values[0].is_empty() {
            Some(BTreeSet::new())
        } else {
            Some(parse_tags(tag_values)?)
        };
    }

    if !descriptor.is_any_field_edited() {
        return Err(ParseError::NothingToEdit);
    }
    Ok(Command::Edit { index, descriptor })
}

fn parse_tag(args: &str, usage: &str) -> Result<(Index, BTreeSet<Tag>), ParseError> {
    let map = tokenize(args, &[PREFIX_TAG]);
    let index = parse_index(map.preamble()).map_err(|_| ParseError::format(usage))?;
    let values = map.all_values(PREFIX_TAG);
    if values.is_empty() {
        return Err(ParseError::format(usage));
    }
    Ok((index, parse_tags(values)?))
}

fn parse_find(args: &str) -> Result<Command, ParseError> {
    let keywords: Vec<String> = args.split_whitespace().map(str::to_string).collect();
    if keywords.is_empty() {
        return Err(ParseError::format(FIND_USAGE));
    }
    Ok(Command::Find(keywords))
}

fn parse_filter(args: &str) -> Result<Command, ParseError> {
    let map = tokenize(args, &[PREFIX_TAG]);
    let values = map.all_values(PREFIX_TAG);
    if !map.preamble().is_empty() || values.is_empty() {
        return Err(ParseError::format(FILTER_USAGE));
    }
    Ok(Command::Filter(parse_tags(values)?))
}

fn parse_file(args: &str, usage: &str) -> Result<PathBuf, ParseError> {
    let map = tokenize(args, &[PREFIX_FILE]);
    map.verify_no_duplicates(&[PREFIX_FILE])?;
    match map.value(PREFIX_FILE) {
        Some(path) if map.preamble().is_empty() && !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(ParseError::format(usage)),
    }
}
