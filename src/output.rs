//! Attaching publications to the host's rendering context.
//!
//! The pipeline returns records; this module is the glue that stores them in
//! the template context a site generator hands to its pages.

use serde_json::{Map, Value};

use crate::processor::{Outcome, Processor, ProcessorError};
use crate::publication::PublicationRecord;
use crate::settings::Settings;

/// Context key the records are published under.
pub const PUBLICATIONS_KEY: &str = "publications";

/// Template context shared by all pages of a build.
pub type Context = Map<String, Value>;

/// Stores `publications` in the context under [`PUBLICATIONS_KEY`].
///
/// The records are serialized before the context is touched, so a failure
/// leaves the context as it was.
pub fn publish(
    context: &mut Context,
    publications: &[PublicationRecord],
) -> Result<(), serde_json::Error> {
    let value = serde_json::to_value(publications)?;
    context.insert(PUBLICATIONS_KEY.to_string(), value);
    Ok(())
}

/// Runs the processor for one build and publishes the records.
///
/// When publications are skipped or the bibliography cannot be parsed, the
/// context is left untouched and templates see no `publications` key.
///
/// # Returns
///
/// The outcome of the run, for callers that want to report it.
pub fn add_publications(
    settings: &Settings,
    context: &mut Context,
    processor: &Processor,
) -> Result<Outcome, ProcessorError> {
    let outcome = processor.run(settings)?;
    if let Some(publications) = outcome.publications() {
        publish(context, publications)?;
    }
    Ok(outcome)
}

/// Renders the context as pretty-printed JSON.
pub fn render_context(context: &Context) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(context)
}
