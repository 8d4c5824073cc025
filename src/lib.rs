//! bibtex-publications: publication lists for static sites.
//!
//! This library provides functionality to:
//! - Read a BibTeX file named in the site settings
//! - Format every entry as HTML with a citation style
//! - Extract links and metadata (pdf, slides, poster, code, session, school)
//! - Re-serialize each entry as a standalone BibTeX snippet
//! - Publish the records, sorted by their `index` field, into a template context

pub mod backend;
#[cfg(feature = "biblatex")]
pub mod biblatex_backend;
pub mod entry;
pub mod output;
pub mod plain;
pub mod processor;
pub mod publication;
pub mod richtext;
pub mod sanitize;
pub mod settings;
pub mod style;

pub use backend::{default_backend, BackendError, BibliographyBackend};
#[cfg(feature = "biblatex")]
pub use biblatex_backend::BiblatexBackend;
pub use entry::{ParsedEntry, Person};
pub use output::{add_publications, publish, Context, PUBLICATIONS_KEY};
pub use processor::{Outcome, Processor, ProcessorError};
pub use publication::{extract_fields, sort_publications, PublicationRecord};
pub use sanitize::{sanitize_text, strip_unescaped_braces};
pub use settings::{IndexPolicy, Settings, PUBLICATIONS_SRC};
pub use style::{builtin_style, builtin_style_names, Style};
