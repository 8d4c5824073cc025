//! Bibliography backend interface.
//!
//! The pipeline never parses or serializes BibTeX itself. It talks to a
//! [`BibliographyBackend`], which reads a whole file into [`ParsedEntry`]
//! values and renders a single entry back into source text.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entry::ParsedEntry;

/// Errors reported by a bibliography backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid bibliography syntax: {0}")]
    Syntax(String),

    #[error("cannot serialize entry '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("no bibliography backend is available (built without the `biblatex` feature)")]
    Unavailable,
}

impl BackendError {
    /// True for failures caused by the bibliography file itself (missing,
    /// unreadable or malformed). Those are recoverable for the host build.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, BackendError::Io { .. } | BackendError::Syntax(_))
    }
}

/// Parsing and writing capability for one bibliography format.
pub trait BibliographyBackend {
    /// Reads every entry of the file at `path`, in file order.
    fn parse_file(&self, path: &Path) -> Result<Vec<ParsedEntry>, BackendError>;

    /// Renders a single entry back into bibliography source text.
    fn write_entry(&self, entry: &ParsedEntry) -> Result<String, BackendError>;
}

/// Returns the backend compiled into this build.
#[cfg(feature = "biblatex")]
pub fn default_backend() -> Result<Box<dyn BibliographyBackend>, BackendError> {
    Ok(Box::new(crate::biblatex_backend::BiblatexBackend))
}

/// Returns the backend compiled into this build.
#[cfg(not(feature = "biblatex"))]
pub fn default_backend() -> Result<Box<dyn BibliographyBackend>, BackendError> {
    Err(BackendError::Unavailable)
}
