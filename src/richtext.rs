//! Styled text produced by citation styles.
//!
//! A [`Text`] is an ordered sequence of [`Part`]s. Plain runs are kept as
//! separate string parts so later passes (see [`crate::sanitize`]) can work on
//! them without touching markup.

/// Named symbols with backend-specific renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// Separator between the blocks of an entry
    Newblock,
    /// Non-breaking space
    Nbsp,
    /// En dash, used in page ranges
    Ndash,
}

/// One atomic piece of styled text.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// A raw text run
    String(String),
    /// Text wrapped in a formatting tag such as `em`
    Tag(String, Text),
    /// Text whose case must not be changed
    Protected(Text),
    /// A hyperlink
    HRef(String, Text),
    Symbol(Symbol),
}

/// An ordered sequence of text parts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub parts: Vec<Part>,
}

impl Text {
    pub fn new() -> Self {
        Text::default()
    }

    pub fn from_parts(parts: Vec<Part>) -> Self {
        Text { parts }
    }

    /// A text consisting of a single string part.
    pub fn plain(s: &str) -> Self {
        Text {
            parts: vec![Part::String(s.to_string())],
        }
    }

    pub fn tag(name: &str, inner: Text) -> Self {
        Text {
            parts: vec![Part::Tag(name.to_string(), inner)],
        }
    }

    pub fn href(url: &str, inner: Text) -> Self {
        Text {
            parts: vec![Part::HRef(url.to_string(), inner)],
        }
    }

    pub fn symbol(symbol: Symbol) -> Self {
        Text {
            parts: vec![Part::Symbol(symbol)],
        }
    }

    /// Appends all parts of `other`.
    pub fn append(&mut self, other: Text) {
        self.parts.extend(other.parts);
    }

    /// Appends a plain string part.
    pub fn push_str(&mut self, s: &str) {
        self.parts.push(Part::String(s.to_string()));
    }

    /// Joins texts with a separator, skipping empty ones.
    pub fn join(texts: Vec<Text>, sep: Text) -> Text {
        let mut joined = Text::new();
        for text in texts.into_iter().filter(|t| !t.is_empty()) {
            if !joined.is_empty() {
                joined.append(sep.clone());
            }
            joined.append(text);
        }
        joined
    }

    /// True when the text renders to nothing.
    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|part| match part {
            Part::String(s) => s.is_empty(),
            Part::Tag(_, inner) | Part::Protected(inner) | Part::HRef(_, inner) => {
                inner.is_empty()
            }
            Part::Symbol(_) => false,
        })
    }

    /// The text with all markup dropped and symbols as plain characters.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::String(s) => out.push_str(s),
                Part::Tag(_, inner) | Part::Protected(inner) | Part::HRef(_, inner) => {
                    out.push_str(&inner.plain_text())
                }
                Part::Symbol(Symbol::Newblock) => out.push(' '),
                Part::Symbol(Symbol::Nbsp) => out.push('\u{a0}'),
                Part::Symbol(Symbol::Ndash) => out.push('\u{2013}'),
            }
        }
        out
    }

    /// Appends a period unless the text already ends with terminal punctuation.
    pub fn add_period(mut self) -> Self {
        let ends_with_punct = self
            .plain_text()
            .trim_end()
            .ends_with(['.', '?', '!']);
        if !self.is_empty() && !ends_with_punct {
            self.push_str(".");
        }
        self
    }

    /// Uppercases the first character of the first non-empty string run.
    /// Protected text is left alone.
    pub fn capfirst(mut self) -> Self {
        self.capitalize_first();
        self
    }

    fn capitalize_first(&mut self) -> bool {
        for part in &mut self.parts {
            match part {
                Part::String(s) => {
                    if let Some(first) = s.chars().next() {
                        let capitalized: String = first
                            .to_uppercase()
                            .chain(s[first.len_utf8()..].chars())
                            .collect();
                        *s = capitalized;
                        return true;
                    }
                }
                Part::Tag(_, inner) | Part::HRef(_, inner) => {
                    if inner.capitalize_first() {
                        return true;
                    }
                }
                Part::Protected(inner) => {
                    if !inner.is_empty() {
                        return true;
                    }
                }
                Part::Symbol(_) => return true,
            }
        }
        false
    }

    /// Renders the text as HTML.
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::String(s) => out.push_str(&escape_html(s)),
                Part::Tag(name, inner) => {
                    out.push_str(&format!("<{}>{}</{}>", name, inner.render_html(), name));
                }
                Part::Protected(inner) => {
                    out.push_str(&format!(
                        "<span class=\"bibtex-protected\">{}</span>",
                        inner.render_html()
                    ));
                }
                Part::HRef(url, inner) => {
                    out.push_str(&format!(
                        "<a href=\"{}\">{}</a>",
                        escape_html(url),
                        inner.render_html()
                    ));
                }
                Part::Symbol(Symbol::Newblock) => out.push('\n'),
                Part::Symbol(Symbol::Nbsp) => out.push_str("&nbsp;"),
                Part::Symbol(Symbol::Ndash) => out.push_str("&ndash;"),
            }
        }
        out
    }
}

/// Escapes the characters HTML treats specially.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
