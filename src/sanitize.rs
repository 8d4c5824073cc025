//! Removal of BibTeX brace-grouping leftovers from formatted text.

use crate::richtext::{Part, Text};

/// Removes every `{` and `}` not directly preceded by a backslash.
///
/// Escaped braces (`\{`, `\}`) are kept as they are. The result contains only
/// escaped braces, so applying the function again changes nothing.
///
/// ```
/// use bibtex_publications::strip_unescaped_braces;
///
/// assert_eq!(
///     strip_unescaped_braces(r"{Company} uses \{braces\}"),
///     r"Company uses \{braces\}"
/// );
/// ```
pub fn strip_unescaped_braces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev = None;
    for c in s.chars() {
        if !((c == '{' || c == '}') && prev != Some('\\')) {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// Sanitizes the string runs of a formatted text, including those inside
/// formatting tags such as `<em>`.
///
/// Protected and linked parts pass through unchanged.
pub fn sanitize_text(text: Text) -> Text {
    Text::from_parts(
        text.parts
            .into_iter()
            .map(|part| match part {
                Part::String(s) => Part::String(strip_unescaped_braces(&s)),
                Part::Tag(name, inner) => Part::Tag(name, sanitize_text(inner)),
                other => other,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_unescaped_braces() {
        assert_eq!(
            strip_unescaped_braces(r"{Company} uses \{braces\}"),
            r"Company uses \{braces\}"
        );
    }

    #[test]
    fn test_strip_nested_and_adjacent() {
        assert_eq!(strip_unescaped_braces("{{Deep}} {A}{B}"), "Deep AB");
        assert_eq!(strip_unescaped_braces(r"\{{x}\}"), r"\{x\}");
    }

    #[test]
    fn test_strip_without_braces() {
        assert_eq!(strip_unescaped_braces("no braces here"), "no braces here");
        assert_eq!(strip_unescaped_braces(""), "");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let inputs = [
            r"{Company} uses \{braces\}",
            r"\{{x}\}",
            r"a\}}b{{\{",
            "{{Deep}}",
        ];
        for input in inputs {
            let once = strip_unescaped_braces(input);
            assert_eq!(strip_unescaped_braces(&once), once, "input: {}", input);
        }
    }

    #[test]
    fn test_sanitize_text_strings_and_tags() {
        // Given: a text mixing raw runs and tagged runs
        let text = Text::from_parts(vec![
            Part::String("{Company} report. ".to_string()),
            Part::Tag("em".to_string(), Text::plain("{IEEE} Transactions")),
            Part::String(r" \{ok\}".to_string()),
        ]);

        // When: we sanitize it
        let sanitized = sanitize_text(text);

        // Then: strings at any tag depth lose their unescaped braces
        assert_eq!(
            sanitized.parts,
            vec![
                Part::String("Company report. ".to_string()),
                Part::Tag("em".to_string(), Text::plain("IEEE Transactions")),
                Part::String(r" \{ok\}".to_string()),
            ]
        );
        assert_eq!(sanitize_text(sanitized.clone()), sanitized);
    }

    #[test]
    fn test_sanitize_text_keeps_protected_and_links() {
        let text = Text::from_parts(vec![
            Part::Protected(Text::plain("{GPU}")),
            Part::HRef(
                "https://example.org/{a}".to_string(),
                Text::plain("https://example.org/{a}"),
            ),
        ]);

        let sanitized = sanitize_text(text.clone());

        assert_eq!(sanitized, text);
    }
}
