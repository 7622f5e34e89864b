//! Interface messages.
//!
//! Every piece of user-facing text emitted by the renderer comes from a
//! message key, the same way MediaWiki extensions look up their
//! translations. The renderer only needs a way to get the text for a key; it
//! does not care where the translations come from.

use crate::config::LoadError;
use regex::Regex;
use serde::Deserialize;
use std::{borrow::Cow, collections::HashMap, path::Path, sync::LazyLock};

/// The built-in English dictionary.
static ENGLISH: LazyLock<Dictionary> =
    LazyLock::new(|| serde_json::from_str(include_str!("../res/i18n/en.json")).unwrap());

/// A source of interface message text.
pub trait Messages {
    /// Returns the raw text of the message with the given key, if it exists.
    fn get(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Returns the text of the message with the given key, with placeholders
    /// `$1`…`$n` replaced by the corresponding `params`.
    ///
    /// Placeholders with no matching parameter are left as-is. Unknown keys
    /// produce `⧼key⧽`, like MediaWiki does.
    fn message(&self, key: &str, params: &[&str]) -> String {
        static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+)").unwrap());

        let Some(text) = self.get(key) else {
            return format!("⧼{key}⧽");
        };

        RE.replace_all(&text, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| params.get(index))
                .map_or_else(|| caps[0].to_string(), |param| (*param).to_string())
        })
        .into_owned()
    }
}

impl<F> Messages for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self(key).map(Cow::Owned)
    }
}

/// A message dictionary loaded from a flat JSON object of keys to text.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    /// The message text, by key.
    entries: HashMap<String, String>,
}

impl Dictionary {
    /// Returns the built-in English dictionary.
    pub fn english() -> Self {
        ENGLISH.clone()
    }

    /// Parses a dictionary from a JSON object.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(Into::into)
    }

    /// Reads a dictionary from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| LoadError::Io {
            path: path.display().to_string(),
            err,
        })?;
        Self::from_json(&text)
    }

    /// Adds all the messages from `other` to this dictionary, replacing any
    /// messages with the same key.
    pub fn extend(&mut self, other: Dictionary) {
        self.entries.extend(other.entries);
    }

    /// Returns the number of messages in the dictionary.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dictionary contains no messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Messages for Dictionary {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self.entries.get(key).map(|text| Cow::Borrowed(text.as_str()))
    }
}
