//! Default backend built on the `biblatex` crate.
//!
//! Field values are converted to raw strings that keep BibTeX brace groups
//! (`{GPU}`) and escape literal braces (`\{`), except for link-like fields,
//! which are flattened to their verbatim text. Entry types keep the tag
//! written in the source, lowercased.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use biblatex::{
    Bibliography, Chunk, ChunksExt, Entry, Person as BibPerson, RawBibliography, Spanned,
};

use crate::backend::{BibliographyBackend, BackendError};
use crate::entry::{ParsedEntry, Person, PERSON_FIELDS};

/// Fields whose values are links or identifiers and never carry markup.
pub const VERBATIM_FIELDS: &[&str] = &[
    "url", "doi", "eprint", "file", "pdf", "slides", "poster", "code",
];

/// BibTeX backend backed by [`biblatex::Bibliography`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BiblatexBackend;

impl BiblatexBackend {
    /// Parses bibliography source text.
    pub fn parse_str(&self, source: &str) -> Result<Vec<ParsedEntry>, BackendError> {
        let raw = RawBibliography::parse(source).map_err(syntax_error)?;
        // biblatex maps aliases and unknown tags onto its own entry types
        let kinds: HashMap<String, String> = raw
            .entries
            .iter()
            .map(|entry| (entry.v.key.v.to_string(), entry.v.kind.v.to_lowercase()))
            .collect();

        let bibliography = Bibliography::from_raw(raw).map_err(syntax_error)?;
        bibliography
            .iter()
            .map(|entry| {
                let kind = kinds
                    .get(&entry.key)
                    .cloned()
                    .unwrap_or_else(|| entry.entry_type.to_string());
                convert_entry(entry, &kind)
            })
            .collect()
    }
}

impl BibliographyBackend for BiblatexBackend {
    fn parse_file(&self, path: &Path) -> Result<Vec<ParsedEntry>, BackendError> {
        let content = fs::read_to_string(path).map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&content)
    }

    /// Writes the entry under its source type and field names.
    ///
    /// Values are escaped by biblatex; persons come first, then the other
    /// fields in name order.
    fn write_entry(&self, entry: &ParsedEntry) -> Result<String, BackendError> {
        let mut out = String::new();
        let write_err = |e: std::fmt::Error| BackendError::Write {
            key: entry.key.clone(),
            reason: e.to_string(),
        };

        writeln!(out, "@{}{{{},", entry.entry_type, entry.key).map_err(write_err)?;
        for (role, people) in &entry.persons {
            let names = people
                .iter()
                .map(Person::bibtex_name)
                .collect::<Vec<_>>()
                .join(" and ");
            let chunks = vec![Spanned::detached(Chunk::Normal(names))];
            writeln!(out, "  {} = {},", role, chunks.to_biblatex_string(false))
                .map_err(write_err)?;
        }
        for (name, raw) in &entry.fields {
            let verbatim = VERBATIM_FIELDS.contains(&name.as_str());
            let value = raw_to_chunks(name, raw).to_biblatex_string(verbatim);
            writeln!(out, "  {} = {},", name, value).map_err(write_err)?;
        }
        out.push('}');

        Ok(out)
    }
}

fn syntax_error(e: biblatex::ParseError) -> BackendError {
    BackendError::Syntax(e.to_string())
}

fn convert_entry(entry: &Entry, kind: &str) -> Result<ParsedEntry, BackendError> {
    let mut parsed = ParsedEntry::new(&entry.key, kind);

    for (name, chunks) in &entry.fields {
        let field = name.to_lowercase();
        if PERSON_FIELDS.contains(&field.as_str()) {
            let people: Vec<BibPerson> = entry.get_as(name).map_err(|e| {
                BackendError::Syntax(format!("entry '{}', field '{}': {}", entry.key, name, e))
            })?;
            parsed
                .persons
                .insert(field, people.into_iter().map(convert_person).collect());
        } else {
            let raw = if VERBATIM_FIELDS.contains(&field.as_str()) {
                chunks_to_verbatim(chunks)
            } else {
                chunks_to_raw(chunks)
            };
            parsed.fields.insert(field, raw);
        }
    }

    Ok(parsed)
}

fn convert_person(person: BibPerson) -> Person {
    Person {
        first: person.given_name,
        prefix: person.prefix,
        last: person.name,
        suffix: person.suffix,
    }
}

/// Concatenates chunk text without any markup.
fn chunks_to_verbatim(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|chunk| match &chunk.v {
            Chunk::Normal(s) => s.as_str(),
            Chunk::Verbatim(s) => s.as_str(),
            Chunk::Math(s) => s.as_str(),
        })
        .collect()
}

/// Converts chunks back to BibTeX-like raw text: brace groups for verbatim
/// chunks, `$...$` for math, escaped braces inside normal text.
fn chunks_to_raw(chunks: &[Spanned<Chunk>]) -> String {
    let mut raw = String::new();
    for chunk in chunks {
        match &chunk.v {
            Chunk::Normal(s) => {
                for c in s.chars() {
                    if c == '{' || c == '}' {
                        raw.push('\\');
                    }
                    raw.push(c);
                }
            }
            Chunk::Verbatim(s) => {
                raw.push('{');
                raw.push_str(s);
                raw.push('}');
            }
            Chunk::Math(s) => {
                raw.push('$');
                raw.push_str(s);
                raw.push('$');
            }
        }
    }
    raw
}

/// Inverse of [`chunks_to_raw`] for a field value.
fn raw_to_chunks(field: &str, raw: &str) -> Vec<Spanned<Chunk>> {
    if VERBATIM_FIELDS.contains(&field) {
        return vec![Spanned::detached(Chunk::Verbatim(raw.to_string()))];
    }

    let mut chunks = Vec::new();
    let mut normal = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('{') | Some('}')) => {
                if let Some(brace) = chars.next() {
                    normal.push(brace);
                }
            }
            '{' => {
                flush_normal(&mut chunks, &mut normal);
                let mut group = String::new();
                let mut depth = 1;
                for inner in chars.by_ref() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    group.push(inner);
                }
                chunks.push(Spanned::detached(Chunk::Verbatim(group)));
            }
            '$' => {
                let rest: String = chars.clone().collect();
                match rest.find('$') {
                    Some(end) => {
                        flush_normal(&mut chunks, &mut normal);
                        let len = rest[..end].chars().count();
                        let math: String = chars.by_ref().take(len).collect();
                        chars.next();
                        chunks.push(Spanned::detached(Chunk::Math(math)));
                    }
                    None => normal.push(c),
                }
            }
            _ => normal.push(c),
        }
    }
    flush_normal(&mut chunks, &mut normal);

    chunks
}

fn flush_normal(chunks: &mut Vec<Spanned<Chunk>>, normal: &mut String) {
    if !normal.is_empty() {
        chunks.push(Spanned::detached(Chunk::Normal(std::mem::take(normal))));
    }
}
