//! Extension tag rendering types and functions.
//!
//! A host Wikitext parser finds an extension tag, extracts its body as plain
//! text, decodes its attributes, and then hands all of that to the
//! [`Renderer`]. The HTML that comes back is injected into the page without
//! any further Wikitext processing.
//!
//! Rendering an extension tag never fails because of bad user input. Invalid
//! tag parameters are reported inside the returned HTML, the same way
//! MediaWiki reports them, so the only errors that escape from here are
//! failures of the output buffer itself.

use crate::{
    config::Config,
    messages::{Dictionary, Messages},
    tag::Tag,
};
use core::fmt;
use std::collections::HashMap;

mod extension_tags;

/// Extension tag attributes, by lowercase name.
pub type Attributes = HashMap<String, String>;

/// An extension tag rendering error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A write to a buffer failed.
    #[error("fmt error: {0}")]
    Fmt(#[from] fmt::Error),
}

/// The standard result type used by all fallible renderer functions.
pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Read-only context available to every extension tag function.
pub(crate) struct State<'a> {
    /// The renderer configuration.
    pub config: &'a Config,
    /// The source of interface messages.
    pub messages: &'a dyn Messages,
}

/// An extension tag renderer.
#[derive(Debug)]
pub struct Renderer<M = Dictionary> {
    /// The renderer configuration.
    config: Config,
    /// The source of interface messages.
    messages: M,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Config::default(), Dictionary::english())
    }
}

impl<M: Messages> Renderer<M> {
    /// Creates a new renderer.
    pub fn new(config: Config, messages: M) -> Self {
        Self { config, messages }
    }

    /// The renderer configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns true if the renderer has an implementation for the extension
    /// tag with the given name.
    pub fn supports(&self, name: &str) -> bool {
        extension_tags::is_extension_tag(&name.to_ascii_lowercase())
    }

    /// Renders a `<map>` tag with the given raw body text and attributes.
    pub fn render_map(&self, body: &str, attributes: &Attributes) -> Result<String> {
        self.render_tag("map", Some(body), attributes)
    }

    /// Renders the extension tag with the given name. Tag names are
    /// case-insensitive.
    pub fn render_tag(
        &self,
        name: &str,
        body: Option<&str>,
        attributes: &Attributes,
    ) -> Result<String> {
        let state = State {
            config: &self.config,
            messages: &self.messages,
        };
        extension_tags::render_extension_tag(&state, &name.to_ascii_lowercase(), attributes, body)
    }

    /// Renders a parsed extension tag.
    pub fn render(&self, tag: &Tag) -> Result<String> {
        self.render_tag(&tag.name, tag.body.as_deref(), &tag.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports() {
        let renderer = Renderer::default();
        assert!(renderer.supports("map"));
        assert!(renderer.supports("Map"));
        assert!(!renderer.supports("timeline"));
    }

    #[test]
    fn tag_names() {
        let renderer = Renderer::default();
        let attributes = Attributes::from([
            ("lat".to_string(), "1".to_string()),
            ("lon".to_string(), "2".to_string()),
            ("z".to_string(), "3".to_string()),
        ]);
        let lower = renderer.render_tag("map", None, &attributes).unwrap();
        assert_eq!(renderer.render_tag("MAP", None, &attributes).unwrap(), lower);
        assert_eq!(renderer.render_map("", &attributes).unwrap(), lower);
        assert_eq!(renderer.config(), &Config::default());
    }

    #[test]
    fn render_parsed() {
        let tag = Tag::parse("<MAP lat=1 lon=2 z=3/>").unwrap();
        assert!(Renderer::default().render(&tag).unwrap().contains("?lat=1&lon=2&zoom=3\""));

        let tag = Tag::parse("<timeline>a</timeline>").unwrap();
        assert_eq!(
            Renderer::default().render(&tag).unwrap(),
            "&lt;timeline&gt;a&lt;/timeline&gt;"
        );
    }
}
