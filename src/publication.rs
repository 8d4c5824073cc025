//! Publication records and the fields they pull out of each entry.

use std::num::ParseIntError;

use serde::Serialize;
use thiserror::Error;

use crate::entry::ParsedEntry;

/// Errors raised while reading the fields of an entry.
#[derive(Error, Debug, PartialEq)]
pub enum FieldError {
    #[error("entry '{key}' has no 'index' field")]
    MissingIndex { key: String },

    #[error("entry '{key}' has a non-integer index '{value}': {source}")]
    InvalidIndex {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// One publication as exposed to page templates.
///
/// Serialized field order is the template contract: key, index, year, text,
/// bibtex, pdf, slides, poster, code, type, session, school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationRecord {
    /// Citation key of the source entry
    pub key: String,
    /// Ordering index; records are sorted by it, highest first
    pub index: i64,
    pub year: Option<String>,
    /// HTML citation text
    pub text: String,
    /// The entry alone, re-serialized as bibliography source
    pub bibtex: String,
    pub pdf: Option<String>,
    pub slides: Option<String>,
    pub poster: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub session: Option<String>,
    pub school: Option<String>,
}

/// Auxiliary fields of an entry, everything a record needs except the
/// rendered text and the re-serialized source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub index: i64,
    pub year: Option<String>,
    pub pdf: Option<String>,
    pub slides: Option<String>,
    pub poster: Option<String>,
    pub code: Option<String>,
    pub entry_type: String,
    pub session: Option<String>,
    pub school: Option<String>,
}

impl EntryFields {
    /// Completes the fields into a record.
    pub fn into_record(self, key: &str, text: String, bibtex: String) -> PublicationRecord {
        PublicationRecord {
            key: key.to_string(),
            index: self.index,
            year: self.year,
            text,
            bibtex,
            pdf: self.pdf,
            slides: self.slides,
            poster: self.poster,
            code: self.code,
            entry_type: self.entry_type,
            session: self.session,
            school: self.school,
        }
    }
}

/// Reads the auxiliary fields of an entry.
///
/// Every field is optional except `index`, which must hold an integer.
///
/// # Errors
///
/// Returns [`FieldError`] if `index` is absent or not an integer.
pub fn extract_fields(entry: &ParsedEntry) -> Result<EntryFields, FieldError> {
    let get = |name: &str| entry.field(name).map(str::to_string);

    let raw_index = entry.field("index").ok_or_else(|| FieldError::MissingIndex {
        key: entry.key.clone(),
    })?;

    Ok(EntryFields {
        index: parse_index(&entry.key, raw_index)?,
        year: get("year"),
        pdf: get("pdf"),
        slides: get("slides"),
        poster: get("poster"),
        code: get("code"),
        entry_type: entry.entry_type.clone(),
        session: get("session"),
        school: get("school"),
    })
}

/// Parses an ordering index; surrounding whitespace and a leading sign are accepted.
pub fn parse_index(key: &str, raw: &str) -> Result<i64, FieldError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|source| FieldError::InvalidIndex {
            key: key.to_string(),
            value: raw.to_string(),
            source,
        })
}

/// Sorts records by index, highest first. Equal indices keep their order.
pub fn sort_publications(records: &mut [PublicationRecord]) {
    records.sort_by(|a, b| b.index.cmp(&a.index));
}
