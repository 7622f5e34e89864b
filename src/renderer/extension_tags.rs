//! Code for handling MediaWiki extension tags.
//!
//! An extension tag receives the raw, unparsed text of its body (if it had
//! one) plus its attributes, and emits HTML that goes into the page as-is. The
//! output is never sent back through a Wikitext parser, so each tag function
//! is responsible for escaping anything that it echoes from its input.

mod simple_map;

use super::{Attributes, Result, State};
use core::fmt::Write as _;

/// A helper struct for passing arguments required by all extension tags.
pub(crate) struct ExtensionTag<'a> {
    /// The attributes of the extension tag.
    attributes: &'a Attributes,
    /// The raw body text of the extension tag, if one existed in the source
    /// text.
    body: Option<&'a str>,
}

impl<'a> ExtensionTag<'a> {
    /// Returns the unevaluated body of the tag as a string.
    #[inline]
    pub fn body(&self) -> &'a str {
        self.body.unwrap_or("")
    }

    /// Returns the value of the attribute with the given name, if it was
    /// given. An attribute given without a value has an empty value.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// The signature of an extension tag function.
type ExtensionTagFn = fn(&mut String, &State<'_>, &ExtensionTag<'_>) -> Result;

/// All supported extension tags.
static EXTENSION_TAGS: phf::Map<&'static str, ExtensionTagFn> = phf::phf_map! {
    "map" => simple_map::simple_map,
};

/// Returns true if there is an extension tag with the given lowercase name.
pub(super) fn is_extension_tag(callee: &str) -> bool {
    EXTENSION_TAGS.contains_key(callee)
}

/// Renders an extension tag.
///
/// Unsupported tags are emitted as escaped text so that the source is still
/// visible in the output.
pub(super) fn render_extension_tag(
    state: &State<'_>,
    callee: &str,
    attributes: &Attributes,
    body: Option<&str>,
) -> Result<String> {
    let mut out = String::new();
    if let Some(extension_tag) = EXTENSION_TAGS.get(callee) {
        extension_tag(&mut out, state, &ExtensionTag { attributes, body })?;
    } else {
        log::warn!("unsupported extension tag <{callee}>");
        let callee = html_escape::encode_text(callee);
        write!(
            out,
            "&lt;{callee}&gt;{}&lt;/{callee}&gt;",
            html_escape::encode_text(&html_escape::decode_html_entities(body.unwrap_or("")))
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, messages::Dictionary};

    #[test]
    fn unknown_tag() {
        let config = Config::default();
        let messages = Dictionary::english();
        let state = State {
            config: &config,
            messages: &messages,
        };
        let out =
            render_extension_tag(&state, "gallery", &Attributes::new(), Some("a <b> &amp; c"))
                .unwrap();
        assert_eq!(out, "&lt;gallery&gt;a &lt;b&gt; &amp; c&lt;/gallery&gt;");
    }

    #[test]
    fn registry() {
        assert!(is_extension_tag("map"));
        assert!(!is_extension_tag("MAP"));
        assert!(!is_extension_tag("gallery"));
    }
}
