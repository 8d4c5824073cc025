//! Publication list processing.
//!
//! This module sequences one build: check the settings, parse the
//! bibliography through the backend, format every entry with the style,
//! pull out the auxiliary fields, re-serialize each entry and sort the
//! resulting records.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn, Span};

use crate::backend::{default_backend, BackendError, BibliographyBackend};
use crate::entry::ParsedEntry;
use crate::plain::PlainStyle;
use crate::publication::{
    extract_fields, sort_publications, EntryFields, FieldError, PublicationRecord,
};
use crate::sanitize::sanitize_text;
use crate::settings::{IndexPolicy, Settings, SettingsError, PUBLICATIONS_STYLE};
use crate::style::{builtin_style, FormatError, Style};

/// Errors that abort the build.
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("bibliography backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("unknown citation style '{0}'")]
    UnknownStyle(String),

    #[error("cannot serialize publications: {0}")]
    Context(#[from] serde_json::Error),
}

/// Result of one build.
#[derive(Debug)]
pub enum Outcome {
    /// No bibliography configured
    Skipped,
    /// The bibliography could not be parsed; the build goes on without it
    Failed(BackendError),
    /// Records sorted by descending index
    Published(Vec<PublicationRecord>),
}

impl Outcome {
    /// The published records, if any.
    pub fn publications(&self) -> Option<&[PublicationRecord]> {
        match self {
            Outcome::Published(records) => Some(records),
            _ => None,
        }
    }
}

/// Runs the publication pipeline for one build.
pub struct Processor {
    backend: Box<dyn BibliographyBackend>,
    style: Box<dyn Style>,
    index_policy: IndexPolicy,
    span: Span,
}

impl Processor {
    /// Creates a processor using `backend`, the plain style and the strict
    /// index policy.
    pub fn new(backend: Box<dyn BibliographyBackend>) -> Self {
        Processor {
            backend,
            style: Box::new(PlainStyle),
            index_policy: IndexPolicy::Strict,
            span: tracing::info_span!("publications"),
        }
    }

    /// Creates a processor with the backend compiled into this build.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unavailable`] when no backend is compiled in.
    pub fn with_default_backend() -> Result<Self, ProcessorError> {
        Ok(Processor::new(default_backend()?))
    }

    /// Applies the style and index policy from the settings.
    pub fn configure(self, settings: &Settings) -> Result<Self, SettingsError> {
        let name = settings.style_name()?;
        let style = builtin_style(name).ok_or_else(|| SettingsError::InvalidValue {
            key: PUBLICATIONS_STYLE.to_string(),
            value: name.to_string(),
        })?;
        Ok(self
            .with_style(style)
            .with_index_policy(settings.index_policy()?))
    }

    pub fn with_style(mut self, style: Box<dyn Style>) -> Self {
        self.style = style;
        self
    }

    /// Selects a builtin style by name.
    pub fn with_style_name(self, name: &str) -> Result<Self, ProcessorError> {
        let style =
            builtin_style(name).ok_or_else(|| ProcessorError::UnknownStyle(name.to_string()))?;
        Ok(self.with_style(style))
    }

    pub fn with_index_policy(mut self, policy: IndexPolicy) -> Self {
        self.index_policy = policy;
        self
    }

    /// Replaces the span every pipeline event is recorded in.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Runs the pipeline for the bibliography named in `settings`.
    ///
    /// # Returns
    ///
    /// [`Outcome::Skipped`] when no bibliography is configured,
    /// [`Outcome::Failed`] when it cannot be parsed, otherwise the records.
    ///
    /// # Errors
    ///
    /// Missing required fields, invalid indices (under the strict policy) and
    /// serialization failures abort with a [`ProcessorError`].
    pub fn run(&self, settings: &Settings) -> Result<Outcome, ProcessorError> {
        let _entered = self.span.enter();
        match settings.publications_src() {
            Some(src) => self.process_file(Path::new(src)),
            None => {
                debug!("no bibliography configured, skipping publications");
                Ok(Outcome::Skipped)
            }
        }
    }

    /// Runs the pipeline for the bibliography at `path`.
    pub fn process_file(&self, path: &Path) -> Result<Outcome, ProcessorError> {
        let _entered = self.span.enter();

        let entries = match self.backend.parse_file(path) {
            Ok(entries) => entries,
            Err(e) if e.is_parse_failure() => {
                warn!(path = %path.display(), error = %e, "failed to parse bibliography file");
                return Ok(Outcome::Failed(e));
            }
            Err(e) => return Err(e.into()),
        };

        let formatted = self.style.format_entries(&entries)?;

        let mut publications = Vec::with_capacity(entries.len());
        for (entry, formatted) in entries.iter().zip(formatted) {
            debug_assert_eq!(entry.key, formatted.key);
            let fields = match self.extract(entry)? {
                Some(fields) => fields,
                None => continue,
            };
            let text = sanitize_text(formatted.text).render_html();
            let bibtex = self.backend.write_entry(entry)?;
            publications.push(fields.into_record(&entry.key, text, bibtex));
        }

        sort_publications(&mut publications);
        for publication in &publications {
            debug!(key = %publication.key, index = publication.index, "publication");
        }
        info!(
            count = publications.len(),
            path = %path.display(),
            style = self.style.name(),
            "collected publications"
        );

        Ok(Outcome::Published(publications))
    }

    /// Extracts the fields of an entry, applying the index policy.
    fn extract(&self, entry: &ParsedEntry) -> Result<Option<EntryFields>, ProcessorError> {
        match extract_fields(entry) {
            Ok(fields) => Ok(Some(fields)),
            Err(e) if self.index_policy == IndexPolicy::Skip => {
                warn!(key = %entry.key, error = %e, "skipping entry without a usable index");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
