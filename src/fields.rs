//! Validated field types for contact records.
//!
//! Every field is a newtype over `String` that can only be built through
//! `parse`, so a `Person` never holds an invalid value. Serde goes through the
//! same path, which means a hand-edited data file is re-validated on load.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const NAME_CONSTRAINTS: &str =
    "Names should only contain alphanumeric characters and spaces, and it should not be blank";
pub const PHONE_CONSTRAINTS: &str =
    "Phone numbers should only contain numbers, and it should be at least 3 digits long";
pub const EMAIL_CONSTRAINTS: &str = "Emails should be of the format local-part@domain. \
    The local-part should only contain alphanumeric characters and these special characters, \
    excluding the parentheses, (+_.-), and may not start or end with a special character. \
    The domain name is made up of domain labels separated by periods, each label made of \
    alphanumeric characters separated only by hyphens, and the last label at least 2 characters long";
pub const ADDRESS_CONSTRAINTS: &str = "Addresses can take any values, and it should not be blank";
pub const TAG_CONSTRAINTS: &str = "Tags names should be alphanumeric";

// local-part@label.label...last, where the last label has at least 2 characters.
const EMAIL_PATTERN: &str = r"^[\p{L}\p{N}]+(?:[+_.\-][\p{L}\p{N}]+)*@(?:[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?\.)*[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"));

macro_rules! string_field {
    ($(#[$meta:meta])* $ty:ident, $validate:expr, $constraint:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $ty(String);

        impl $ty {
            /// Trim and validate `raw`.
            pub fn parse(raw: &str) -> Result<Self, ValidationError> {
                let trimmed = raw.trim();
                let check: fn(&str) -> bool = $validate;
                if check(trimmed) {
                    Ok($ty(trimmed.to_string()))
                } else {
                    Err(ValidationError($constraint.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                $ty::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    };
}

string_field!(
    /// A person's name. Identity comparisons ignore case, see [`Name::same_as`].
    Name,
    |s| {
        let mut chars = s.chars();
        matches!(chars.next(), Some(c) if c.is_alphanumeric())
            && chars.all(|c| c.is_alphanumeric() || c == ' ')
    },
    NAME_CONSTRAINTS
);

string_field!(
    Phone,
    |s| s.len() >= 3 && s.chars().all(|c| c.is_ascii_digit()),
    PHONE_CONSTRAINTS
);

string_field!(Email, |s| EMAIL_RE.is_match(s), EMAIL_CONSTRAINTS);

string_field!(
    Address,
    |s| s.chars().next().is_some_and(|c| !c.is_whitespace()),
    ADDRESS_CONSTRAINTS
);

string_field!(
    /// A single-word label attached to a person.
    Tag,
    |s| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric()),
    TAG_CONSTRAINTS
);

impl Name {
    /// Case-insensitive comparison used to decide whether two records are
    /// the same person.
    pub fn same_as(&self, other: &Name) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }

    /// Whether any whitespace-separated word of the name equals `keyword`,
    /// ignoring case.
    pub fn has_word(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.0.split_whitespace().any(|w| w.to_lowercase() == keyword)
    }
}
