//! File storage: the JSON data file, CSV/JSON export and import, and backups.
//!
//! The data file is `{ "persons": [ ... ] }`. Field values are re-validated
//! on load, so a hand-edited file with an invalid phone number or a repeated
//! name is reported instead of silently accepted.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use tracing::{debug, info};

use crate::address_book::AddressBook;
use crate::error::{StorageError, ValidationError};
use crate::fields::*;
use crate::person::Person;

#[derive(Deserialize)]
struct StoredBook {
    #[serde(default)]
    persons: Vec<Person>,
}

#[derive(Serialize)]
struct StoredBookRef<'a> {
    persons: Vec<&'a Person>,
}

const CSV_HEADER: [&str; 5] = ["name", "phone", "email", "address", "tags"];

/// One CSV row. Tags are joined with `;`.
#[derive(Debug, Serialize, Deserialize)]
struct CsvPerson {
    name: String,
    phone: String,
    email: String,
    address: String,
    #[serde(default)]
    tags: String,
}

impl CsvPerson {
    fn from_person(p: &Person) -> Self {
        CsvPerson {
            name: p.name.to_string(),
            phone: p.phone.to_string(),
            email: p.email.to_string(),
            address: p.address.to_string(),
            tags: p.tags.iter().map(Tag::as_str).collect::<Vec<_>>().join(";"),
        }
    }

    fn into_person(self) -> Result<Person, ValidationError> {
        let tags = self
            .tags
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Tag::parse)
            .collect::<Result<BTreeSet<Tag>, _>>()?;
        Ok(Person::new(
            Name::parse(&self.name)?,
            Phone::parse(&self.phone)?,
            Email::parse(&self.email)?,
            Address::parse(&self.address)?,
            tags,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Json,
}

fn format_of(path: &Path) -> Result<FileFormat, StorageError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(FileFormat::Csv),
        "json" => Ok(FileFormat::Json),
        _ => Err(StorageError::UnsupportedFormat(path.display().to_string())),
    }
}

fn conversion(path: &Path, reason: impl Into<String>) -> StorageError {
    StorageError::DataConversion { path: path.to_path_buf(), reason: reason.into() }
}

fn read_json_persons(path: &Path) -> Result<Vec<Person>, StorageError> {
    let buf = fs::read_to_string(path)?;
    match serde_json::from_str::<StoredBook>(&buf) {
        Ok(stored) => Ok(stored.persons),
        Err(e) if e.classify() == Category::Data => Err(conversion(path, e.to_string())),
        Err(e) => Err(e.into()),
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let mut f = File::create(&tmp)?;
    f.write_all(data)?;
    f.flush()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Load the address book. `Ok(None)` means the file does not exist yet.
pub fn load_address_book(path: &Path) -> Result<Option<AddressBook>, StorageError> {
    if !path.exists() {
        debug!(path = %path.display(), "data file not found");
        return Ok(None);
    }
    let persons = read_json_persons(path)?;
    let book = AddressBook::from_persons(persons)
        .map_err(|_| conversion(path, "Persons list contains duplicate person(s)."))?;
    info!(path = %path.display(), count = book.len(), "loaded address book");
    Ok(Some(book))
}

/// Save the address book as pretty JSON via temp file + rename.
pub fn save_address_book(book: &AddressBook, path: &Path) -> Result<(), StorageError> {
    let stored = StoredBookRef { persons: book.persons().iter().collect() };
    let data = serde_json::to_string_pretty(&stored)?;
    write_atomic(path, data.as_bytes())?;
    debug!(path = %path.display(), count = book.len(), "saved address book");
    Ok(())
}

/// Write `persons` as CSV or JSON depending on the file extension.
pub fn export_persons(persons: &[&Person], path: &Path) -> Result<(), StorageError> {
    let format = format_of(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match format {
        FileFormat::Json => {
            let stored = StoredBookRef { persons: persons.to_vec() };
            fs::write(path, serde_json::to_string_pretty(&stored)?)?;
        }
        FileFormat::Csv => {
            // Written by hand so an empty list still gets a header row.
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
            writer.write_record(CSV_HEADER)?;
            for p in persons {
                writer.serialize(CsvPerson::from_person(p))?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// Read persons from a CSV or JSON file. Any invalid row fails the whole read.
pub fn import_persons(path: &Path) -> Result<Vec<Person>, StorageError> {
    match format_of(path)? {
        FileFormat::Json => read_json_persons(path),
        FileFormat::Csv => {
            let mut reader = csv::Reader::from_path(path)?;
            let mut persons = Vec::new();
            for (i, row) in reader.deserialize::<CsvPerson>().enumerate() {
                // Line 1 is the header.
                let line = i + 2;
                let person = row?
                    .into_person()
                    .map_err(|e| conversion(path, format!("line {}: {}", line, e)))?;
                persons.push(person);
            }
            Ok(persons)
        }
    }
}

/// Copy the data file into a `backup/` directory beside it, timestamped.
pub fn create_backup(path: &Path) -> Result<PathBuf, StorageError> {
    if !path.exists() {
        return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "Data file does not exist").into());
    }

    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("contacts.json");
    let backup_path = backup_dir.join(format!("{}_{}", timestamp, file_name));
    fs::copy(path, &backup_path)?;
    info!(backup = %backup_path.display(), "created backup");
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::person;

    fn book() -> AddressBook {
        AddressBook::from_persons(vec![
            person("Alice Pauline", "94351253", "alice@example.com", "123, Jurong West Ave 6", &["friends"]),
            person("Benson Meier", "98765432", "johnd@example.com", "311 Clementi \"Ave\" 2", &["owesMoney", "friends"]),
            person("Carl Kurz", "95352563", "heinz@example.com", "wall street", &[]),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_address_book(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("contacts.json");
        save_address_book(&book(), &path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        let loaded = load_address_book(&path).unwrap().unwrap();
        assert_eq!(loaded, book());
    }

    #[test]
    fn test_invalid_field_is_data_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"persons":[{"name":"Hans","phone":"+651234","email":"hans@example.com","address":"4th street","tags":[]}]}"#,
        )
        .unwrap();
        let err = load_address_book(&path).unwrap_err();
        assert!(matches!(err, StorageError::DataConversion { .. }));
        assert!(err.to_string().contains("Phone numbers"));
    }

    #[test]
    fn test_duplicate_persons_is_data_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.json");
        let person = r#"{"name":"Hans","phone":"1234","email":"hans@example.com","address":"4th street"}"#;
        fs::write(&path, format!(r#"{{"persons":[{person},{person}]}}"#)).unwrap();
        let err = load_address_book(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_address_book(&path), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_csv_export_import_keeps_quotes_and_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let b = book();
        let persons: Vec<&Person> = b.persons().iter().collect();
        export_persons(&persons, &path).unwrap();

        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("name,phone,email,address,tags\n"));

        let back = import_persons(&path).unwrap();
        assert_eq!(back, b.persons());
    }

    #[test]
    fn test_json_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.JSON");
        let b = book();
        let persons: Vec<&Person> = b.persons().iter().take(1).collect();
        export_persons(&persons, &path).unwrap();
        let back = import_persons(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].name.as_str(), "Alice Pauline");
    }

    #[test]
    fn test_empty_csv_export_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        export_persons(&[], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,phone,email,address,tags\n");
        assert!(import_persons(&path).unwrap().is_empty());
    }

    #[test]
    fn test_csv_bad_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "name,phone,email,address,tags\nAmy,123,amy@example.com,Here,\nBea,12,bea@example.com,There,\n").unwrap();
        let err = import_persons(&path).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = export_persons(&[], Path::new("contacts.txt")).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_backup_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        save_address_book(&book(), &path).unwrap();
        let backup = create_backup(&path).unwrap();
        assert!(backup.starts_with(dir.path().join("backup")));
        assert!(backup.to_string_lossy().ends_with("_contacts.json"));
        assert_eq!(fs::read(&path).unwrap(), fs::read(&backup).unwrap());
    }

    #[test]
    fn test_backup_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create_backup(&dir.path().join("missing.json")).is_err());
    }
}
