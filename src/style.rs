//! Citation styles.
//!
//! A style turns a [`ParsedEntry`] into styled [`Text`]. Styles are looked up
//! by name among the builtin ones.

use thiserror::Error;

use crate::entry::ParsedEntry;
use crate::plain::PlainStyle;
use crate::richtext::Text;

/// Errors that can occur while formatting an entry.
#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("entry '{key}' ({entry_type}) is missing required field '{field}'")]
    MissingField {
        key: String,
        entry_type: String,
        field: String,
    },
}

/// An entry rendered by a style, joined to its source by key.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedEntry {
    pub key: String,
    pub text: Text,
}

/// A set of rules mapping entry fields to human-readable text.
pub trait Style {
    /// Builtin name of the style.
    fn name(&self) -> &'static str;

    /// Formats a single entry.
    fn format_entry(&self, entry: &ParsedEntry) -> Result<FormattedEntry, FormatError>;

    /// Formats every entry, preserving input order.
    fn format_entries(&self, entries: &[ParsedEntry]) -> Result<Vec<FormattedEntry>, FormatError> {
        entries.iter().map(|entry| self.format_entry(entry)).collect()
    }
}

/// Single source of truth for builtin style names.
const BUILTIN_STYLES: &[&str] = &["plain"];

/// The style used when none is configured.
pub const DEFAULT_STYLE: &str = "plain";

/// Returns a builtin style by name.
///
/// # Returns
///
/// The style if `name` is a builtin style, or None.
pub fn builtin_style(name: &str) -> Option<Box<dyn Style>> {
    match name {
        "plain" => Some(Box::new(PlainStyle)),
        _ => None,
    }
}

/// Returns the list of available builtin style names.
pub fn builtin_style_names() -> Vec<&'static str> {
    BUILTIN_STYLES.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_style_plain() {
        let style = builtin_style("plain");
        assert!(style.is_some());
        assert_eq!(style.unwrap().name(), "plain");
    }

    #[test]
    fn test_builtin_style_unknown() {
        assert!(builtin_style("vancouver").is_none());
    }

    #[test]
    fn test_builtin_style_names_resolve() {
        // Every advertised name must resolve to a style of the same name
        for name in builtin_style_names() {
            let style = builtin_style(name).expect("listed style should exist");
            assert_eq!(style.name(), name);
        }
        assert!(builtin_style_names().contains(&DEFAULT_STYLE));
    }

    #[test]
    fn test_format_entries_preserves_order() {
        let entries = vec![
            ParsedEntry::new("b", "misc").with_field("title", "Second"),
            ParsedEntry::new("a", "misc").with_field("title", "First"),
        ];
        let formatted = PlainStyle.format_entries(&entries).unwrap();
        let keys: Vec<&str> = formatted.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
