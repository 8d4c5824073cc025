//! Bibliography entry model.
//!
//! A [`ParsedEntry`] is what a backend hands to the pipeline: the entry key,
//! its type tag, the raw field values and the person lists (authors, editors)
//! split out of the field mapping.

use std::collections::BTreeMap;

/// Fields holding person lists rather than plain values.
pub const PERSON_FIELDS: &[&str] = &["author", "editor"];

/// A single person from an `author` or `editor` field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Person {
    /// Given names ("John Paul")
    pub first: String,
    /// Particle before the last name ("van", "de la")
    pub prefix: String,
    /// Family name
    pub last: String,
    /// Suffix ("Jr.", "III")
    pub suffix: String,
}

impl Person {
    pub fn new(first: &str, last: &str) -> Self {
        Person {
            first: first.to_string(),
            last: last.to_string(),
            ..Default::default()
        }
    }

    /// Renders the name in reading order: `First von Last, Jr`.
    pub fn display_name(&self) -> String {
        let mut name = [self.first.as_str(), self.prefix.as_str(), self.last.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if !self.suffix.is_empty() {
            name.push_str(", ");
            name.push_str(&self.suffix);
        }
        name
    }

    /// Renders the name in BibTeX sort form: `von Last, Jr, First`.
    pub fn bibtex_name(&self) -> String {
        let mut name = if self.prefix.is_empty() {
            self.last.clone()
        } else {
            format!("{} {}", self.prefix, self.last)
        };
        if !self.suffix.is_empty() {
            name.push_str(", ");
            name.push_str(&self.suffix);
        }
        if !self.first.is_empty() {
            name.push_str(", ");
            name.push_str(&self.first);
        }
        name
    }
}

/// One bibliographic record as produced by a backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedEntry {
    /// Unique citation key
    pub key: String,
    /// Entry type tag, lowercase ("article", "phdthesis", ...)
    pub entry_type: String,
    /// Raw field values keyed by lowercase field name
    pub fields: BTreeMap<String, String>,
    /// Person lists keyed by role ("author", "editor")
    pub persons: BTreeMap<String, Vec<Person>>,
}

impl ParsedEntry {
    pub fn new(key: &str, entry_type: &str) -> Self {
        ParsedEntry {
            key: key.to_string(),
            entry_type: entry_type.to_lowercase(),
            ..Default::default()
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_lowercase(), value.to_string());
        self
    }

    /// Builder-style person list setter.
    pub fn with_persons(mut self, role: &str, persons: Vec<Person>) -> Self {
        self.persons.insert(role.to_lowercase(), persons);
        self
    }

    /// Returns the raw value of a field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns the persons for a role; empty when the role is absent.
    pub fn persons(&self, role: &str) -> &[Person] {
        self.persons.get(role).map(Vec::as_slice).unwrap_or(&[])
    }
}
