//! The "plain" citation style.
//!
//! Follows the layout of BibTeX's `plain.bst`: an entry is a sequence of
//! blocks separated by [`Symbol::Newblock`], each block a sentence whose parts
//! are joined with commas, capitalized and terminated by a period. Field
//! values are copied as-is, so brace groups from the source survive into the
//! text and are dealt with by [`crate::sanitize`].

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::{ParsedEntry, Person};
use crate::richtext::{Symbol, Text};
use crate::style::{FormatError, FormattedEntry, Style};

static DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*-+\s*").expect("dash pattern is valid"));

/// Classic author-year-title style with numbered-list layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyle;

impl Style for PlainStyle {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn format_entry(&self, entry: &ParsedEntry) -> Result<FormattedEntry, FormatError> {
        let template = Template { entry };
        let text = match entry.entry_type.as_str() {
            "article" => template.article()?,
            "book" => template.book()?,
            "booklet" => template.booklet()?,
            "inbook" => template.inbook()?,
            "incollection" => template.incollection()?,
            "inproceedings" | "conference" => template.inproceedings()?,
            "manual" => template.manual()?,
            "mastersthesis" => template.thesis("Master's thesis", false)?,
            "phdthesis" => template.thesis("PhD thesis", true)?,
            "proceedings" => template.proceedings()?,
            "techreport" => template.techreport()?,
            "unpublished" => template.unpublished()?,
            _ => template.misc()?,
        };
        Ok(FormattedEntry {
            key: entry.key.clone(),
            text,
        })
    }
}

/// Joins the present parts with `", "`, capitalizes and adds a period.
fn sentence(parts: impl IntoIterator<Item = Option<Text>>) -> Option<Text> {
    let text = Text::join(parts.into_iter().flatten().collect(), Text::plain(", "));
    if text.is_empty() {
        None
    } else {
        Some(text.capfirst().add_period())
    }
}

fn words(parts: impl IntoIterator<Item = Option<Text>>) -> Option<Text> {
    non_empty(Text::join(parts.into_iter().flatten().collect(), Text::plain(" ")))
}

/// Joins with non-breaking spaces ("volume~3").
fn together(parts: impl IntoIterator<Item = Option<Text>>) -> Option<Text> {
    non_empty(Text::join(
        parts.into_iter().flatten().collect(),
        Text::symbol(Symbol::Nbsp),
    ))
}

fn toplevel(blocks: impl IntoIterator<Item = Option<Text>>) -> Text {
    Text::join(
        blocks.into_iter().flatten().collect(),
        Text::symbol(Symbol::Newblock),
    )
}

fn emph(text: Text) -> Text {
    Text::tag("em", text)
}

fn non_empty(text: Text) -> Option<Text> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn literal(s: &str) -> Option<Text> {
    Some(Text::plain(s))
}

/// Replaces dash runs with an en dash: `1--10` becomes `1–10`.
fn dashify(s: &str) -> Text {
    let mut text = Text::new();
    for (i, piece) in DASHES.split(s).enumerate() {
        if i > 0 {
            text.append(Text::symbol(Symbol::Ndash));
        }
        text.push_str(piece);
    }
    text
}

/// "A", "A and B", "A, B, and C"; a trailing "others" becomes "et al.".
fn format_names(persons: &[Person]) -> Text {
    let (persons, et_al) = match persons.split_last() {
        Some((last, rest)) if last.last == "others" && !rest.is_empty() => (rest, true),
        _ => (persons, false),
    };
    let names: Vec<String> = persons.iter().map(Person::display_name).collect();
    let mut joined = match names.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] if !et_al => format!("{} and {}", first, second),
        [init @ .., last] if !et_al => format!("{}, and {}", init.join(", "), last),
        all => all.join(", "),
    };
    if et_al {
        joined.push_str(" et al.");
    }
    Text::plain(&joined)
}

struct Template<'a> {
    entry: &'a ParsedEntry,
}

impl Template<'_> {
    fn missing(&self, field: &str) -> FormatError {
        FormatError::MissingField {
            key: self.entry.key.clone(),
            entry_type: self.entry.entry_type.clone(),
            field: field.to_string(),
        }
    }

    fn raw(&self, name: &str) -> Option<&str> {
        self.entry.field(name).filter(|value| !value.trim().is_empty())
    }

    fn field(&self, name: &str) -> Option<Text> {
        self.raw(name).map(Text::plain)
    }

    fn required(&self, name: &str) -> Result<Text, FormatError> {
        self.field(name).ok_or_else(|| self.missing(name))
    }

    fn names(&self, role: &str) -> Option<Text> {
        let persons = self.entry.persons(role);
        if persons.is_empty() {
            None
        } else {
            Some(format_names(persons))
        }
    }

    fn author(&self) -> Result<Option<Text>, FormatError> {
        self.names("author")
            .map(|names| sentence([Some(names)]))
            .ok_or_else(|| self.missing("author"))
    }

    fn optional_author(&self) -> Option<Text> {
        sentence([self.names("author")])
    }

    fn editor(&self, as_sentence: bool) -> Option<Text> {
        let count = self.entry.persons("editor").len();
        let names = self.names("editor")?;
        let word = if count == 1 { "editor" } else { "editors" };
        let text = Text::join(vec![names, Text::plain(word)], Text::plain(", "));
        if as_sentence {
            sentence([Some(text)])
        } else {
            Some(text)
        }
    }

    fn author_or_editor(&self) -> Result<Option<Text>, FormatError> {
        match self.optional_author().or_else(|| self.editor(true)) {
            Some(text) => Ok(Some(text)),
            None => Err(self.missing("author or editor")),
        }
    }

    fn title(&self) -> Result<Option<Text>, FormatError> {
        Ok(sentence([Some(self.required("title")?)]))
    }

    fn btitle(&self, which: &str, as_sentence: bool) -> Result<Option<Text>, FormatError> {
        let title = emph(self.required(which)?);
        if as_sentence {
            Ok(sentence([Some(title)]))
        } else {
            Ok(Some(title))
        }
    }

    /// "Month Year"; the year is required.
    fn date(&self) -> Result<Option<Text>, FormatError> {
        Ok(words([self.field("month"), Some(self.required("year")?)]))
    }

    fn optional_date(&self) -> Option<Text> {
        self.raw("year")?;
        self.date().ok().flatten()
    }

    fn pages(&self) -> Option<Text> {
        self.raw("pages").map(dashify)
    }

    fn edition(&self) -> Option<Text> {
        let edition = self.raw("edition")?.to_lowercase();
        words([literal(&edition), literal("edition")])
    }

    fn volume_and_series(&self, as_sentence: bool) -> Option<Text> {
        let series = self.field("series");
        let result = if let Some(volume) = self.field("volume") {
            let label = if as_sentence { "Volume" } else { "volume" };
            words([
                together([literal(label), Some(volume)]),
                series.and_then(|s| words([literal("of"), Some(emph(s))])),
            ])
        } else if let Some(number) = self.field("number") {
            let label = if as_sentence { "Number" } else { "number" };
            words([
                together([literal(label), Some(number)]),
                series.and_then(|s| words([literal("in"), Some(s)])),
            ])
        } else {
            series
        };
        if as_sentence {
            sentence([result])
        } else {
            result
        }
    }

    fn chapter_and_pages(&self) -> Option<Text> {
        let chapter = self
            .field("chapter")
            .and_then(|chapter| together([literal("chapter"), Some(chapter)]));
        let pages = self
            .pages()
            .and_then(|pages| together([literal("pages"), Some(pages)]));
        non_empty(Text::join(
            [chapter, pages].into_iter().flatten().collect(),
            Text::plain(", "),
        ))
    }

    fn address_organization_publisher_date(
        &self,
        include_organization: bool,
    ) -> Result<Option<Text>, FormatError> {
        let organization = if include_organization {
            self.field("organization")
        } else {
            None
        };
        let publisher = self.field("publisher");
        let date = self.date()?;
        match self.field("address") {
            Some(address) => Ok(words([
                sentence([Some(address), date]),
                sentence([organization, publisher]),
            ])),
            None => Ok(sentence([organization, publisher, date])),
        }
    }

    fn note(&self) -> Option<Text> {
        sentence([self.field("note")])
    }

    fn web_refs(&self) -> Option<Text> {
        let url = self.raw("url").map(|url| {
            let mut text = Text::plain("URL: ");
            text.append(Text::href(url, Text::plain(url)));
            if let Some(visited) = self.field("urldate") {
                text.push_str(" (visited on ");
                text.append(visited);
                text.push_str(")");
            }
            text
        });
        let eprint = self.raw("eprint").map(|id| {
            Text::href(
                &format!("https://arxiv.org/abs/{}", id),
                Text::plain(&format!("arXiv:{}", id)),
            )
        });
        let pubmed = self.raw("pubmed").map(|id| {
            Text::href(
                &format!("https://www.ncbi.nlm.nih.gov/pubmed/{}", id),
                Text::plain(&format!("PMID:{}", id)),
            )
        });
        let doi = self.raw("doi").map(|id| {
            Text::href(
                &format!("https://doi.org/{}", id),
                Text::plain(&format!("doi:{}", id)),
            )
        });
        sentence([url, eprint, pubmed, doi])
    }

    fn article(&self) -> Result<Text, FormatError> {
        let pages = self.pages();
        let volume_and_pages = match self.field("volume") {
            Some(mut text) => {
                if let Some(number) = self.field("number") {
                    text.push_str("(");
                    text.append(number);
                    text.push_str(")");
                }
                if let Some(pages) = pages {
                    text.push_str(":");
                    text.append(pages);
                }
                Some(text)
            }
            None => pages.and_then(|p| words([literal("pages"), Some(p)])),
        };
        Ok(toplevel([
            self.author()?,
            self.title()?,
            sentence([
                Some(emph(self.required("journal")?)),
                volume_and_pages,
                self.date()?,
            ]),
            self.note(),
            self.web_refs(),
        ]))
    }

    fn book(&self) -> Result<Text, FormatError> {
        Ok(toplevel([
            self.author_or_editor()?,
            self.btitle("title", true)?,
            self.volume_and_series(true),
            sentence([
                Some(self.required("publisher")?),
                self.field("address"),
                self.edition(),
                self.date()?,
            ]),
            sentence([self
                .field("isbn")
                .and_then(|isbn| words([literal("ISBN"), Some(isbn)]))]),
            self.note(),
            self.web_refs(),
        ]))
    }

    fn booklet(&self) -> Result<Text, FormatError> {
        Ok(toplevel([
            self.optional_author(),
            self.title()?,
            sentence([
                self.field("howpublished"),
                self.field("address"),
                self.optional_date(),
            ]),
            self.note(),
            self.web_refs(),
        ]))
    }

    fn inbook(&self) -> Result<Text, FormatError> {
        Ok(toplevel([
            self.author_or_editor()?,
            sentence([self.btitle("title", false)?, self.chapter_and_pages()]),
            self.volume_and_series(true),
            sentence([
                Some(self.required("publisher")?),
                self.field("address"),
                self.edition(),
                self.date()?,
            ]),
            self.note(),
            self.web_refs(),
        ]))
    }

    fn incollection(&self) -> Result<Text, FormatError> {
        Ok(toplevel([
            self.author()?,
            self.title()?,
            words([
                literal("In"),
                sentence([
                    self.editor(false),
                    self.btitle("booktitle", false)?,
                    self.volume_and_series(false),
                    self.chapter_and_pages(),
                ]),
            ]),
            sentence([
                self.field("publisher"),
                self.field("address"),
                self.edition(),
                self.date()?,
            ]),
            self.note(),
            self.web_refs(),
        ]))
    }

    fn inproceedings(&self) -> Result<Text, FormatError> {
        Ok(toplevel([
            self.author()?,
            self.title()?,
            words([
                literal("In"),
                sentence([
                    self.editor(false),
                    self.btitle("booktitle", false)?,
                    self.volume_and_series(false),
                    self.pages(),
                ]),
            ]),
            self.address_organization_publisher_date(true)?,
            self.note(),
            self.web_refs(),
        ]))
    }

    fn manual(&self) -> Result<Text, FormatError> {
        Ok(toplevel([
            self.optional_author(),
            self.btitle("title", true)?,
            sentence([
                self.field("organization"),
                self.field("address"),
                self.edition(),
                self.optional_date(),
            ]),
            self.note(),
            self.web_refs(),
        ]))
    }

    fn misc(&self) -> Result<Text, FormatError> {
        Ok(toplevel([
            self.optional_author(),
            sentence([self.field("title")]),
            sentence([self.field("howpublished"), self.optional_date()]),
            self.note(),
            self.web_refs(),
        ]))
    }

    fn proceedings(&self) -> Result<Text, FormatError> {
        let has_editors = !self.entry.persons("editor").is_empty();
        let lead = if has_editors {
            self.editor(true)
        } else {
            sentence([self.field("organization")])
        };
        Ok(toplevel([
            lead,
            self.btitle("title", true)?,
            self.volume_and_series(true),
            self.address_organization_publisher_date(has_editors)?,
            self.note(),
            self.web_refs(),
        ]))
    }

    fn techreport(&self) -> Result<Text, FormatError> {
        let kind = self
            .field("type")
            .unwrap_or_else(|| Text::plain("Technical Report"));
        Ok(toplevel([
            self.author()?,
            self.title()?,
            sentence([
                words([Some(kind), self.field("number")]),
                Some(self.required("institution")?),
                self.field("address"),
                self.date()?,
            ]),
            self.note(),
            self.web_refs(),
        ]))
    }

    /// Master's and PhD theses; PhD titles are emphasized.
    fn thesis(&self, default_kind: &str, emphasize_title: bool) -> Result<Text, FormatError> {
        let title = if emphasize_title {
            self.btitle("title", true)?
        } else {
            self.title()?
        };
        let kind = self
            .field("type")
            .unwrap_or_else(|| Text::plain(default_kind));
        Ok(toplevel([
            self.author()?,
            title,
            sentence([
                Some(kind),
                Some(self.required("school")?),
                self.field("address"),
                self.date()?,
            ]),
            self.note(),
            self.web_refs(),
        ]))
    }

    fn unpublished(&self) -> Result<Text, FormatError> {
        Ok(toplevel([
            self.author()?,
            self.title()?,
            sentence([Some(self.required("note")?), self.optional_date()]),
            self.web_refs(),
        ]))
    }
}
