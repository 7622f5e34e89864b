//! Extension tag source parsing.
//!
//! This follows what the MediaWiki preprocessor does when it finds an
//! extension tag: the start tag ends at the first `>`, the body is everything
//! up to the matching end tag, and the end tag is matched case-insensitively.
//! Attributes are then decoded with the same loose rules as HTML attributes in
//! Wikitext.

use crate::renderer::Attributes;
use html_escape::decode_html_entities;
use regex::{Regex, RegexBuilder};
use std::{str::FromStr, sync::LazyLock};

/// An extension tag parsing error.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum ParseError {
    /// The source text does not start with a tag.
    #[error("not an extension tag")]
    NotATag,

    /// A start tag had no corresponding end tag.
    #[error("missing end tag for <{0}>")]
    Unclosed(String),

    /// There was more text after the end of the tag.
    #[error("unexpected text after end of tag: '{0}'")]
    TrailingText(String),
}

/// A parsed extension tag.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tag {
    /// The lowercase name of the tag.
    pub name: String,
    /// The decoded attributes of the tag.
    pub attributes: Attributes,
    /// The raw body text of the tag, or `None` if the tag was self-closing.
    pub body: Option<String>,
}

impl Tag {
    /// Parses a single extension tag, like `<map lat=1 lon=2 z=3 />` or
    /// `<map>lat=1|lon=2|z=3</map>`. Whitespace around the tag is ignored.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^<([A-Za-z][A-Za-z0-9_-]*)(\s[^>]*?)?(/?)>").unwrap()
        });

        let source = source.trim_ascii();
        let caps = START_TAG.captures(source).ok_or(ParseError::NotATag)?;
        let name = caps[1].to_ascii_lowercase();
        let attributes = caps
            .get(2)
            .map_or_else(Attributes::new, |m| parse_attributes(m.as_str()));
        let rest = &source[caps[0].len()..];

        let (body, rest) = if caps[3].is_empty() {
            let (body, rest) = split_end_tag(rest, &name)?;
            (Some(body.to_string()), rest)
        } else {
            (None, rest)
        };

        let rest = rest.trim_ascii();
        if !rest.is_empty() {
            return Err(ParseError::TrailingText(rest.to_string()));
        }

        Ok(Self {
            name,
            attributes,
            body,
        })
    }
}

impl FromStr for Tag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Splits the text after a start tag into the tag body and the text after the
/// first matching end tag.
fn split_end_tag<'a>(rest: &'a str, name: &str) -> Result<(&'a str, &'a str), ParseError> {
    // The name is restricted by the start tag pattern, so this cannot fail
    // except by some bug in the pattern
    let end_tag = RegexBuilder::new(&format!(r"</{}\s*>", regex::escape(name)))
        .case_insensitive(true)
        .build()
        .map_err(|_| ParseError::NotATag)?;

    end_tag
        .find(rest)
        .map(|m| (&rest[..m.start()], &rest[m.end()..]))
        .ok_or_else(|| ParseError::Unclosed(name.to_string()))
}

/// Parses and decodes tag attributes.
///
/// Names are lowercased. Values may be double-quoted, single-quoted, or bare.
/// An attribute with no value has an empty value. Later duplicates win.
fn parse_attributes(text: &str) -> Attributes {
    static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"([^\s/>="'][^\s/>="']*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#,
        )
        .unwrap()
    });

    ATTRIBUTE
        .captures_iter(text)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            // Whitespace inside values is collapsed the same way as the
            // MediaWiki sanitiser does it
            let value = decode_html_entities(value)
                .split_ascii_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            (name, value)
        })
        .collect()
}
