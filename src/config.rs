//! Renderer configuration.
//!
//! The `<map>` tag never talks to the map service itself; it only needs to know
//! where the service lives so that the browser can fetch the image. These URLs
//! are the only out-of-band data the renderer needs.

use serde::Deserialize;
use std::path::Path;

/// The default base URL of the static map image service.
pub const DEFAULT_SERVICE_URL: &str = "https://tah.openstreetmap.org/MapOf/?";

/// The default base URL of the interactive map viewer.
pub const DEFAULT_VIEWER_URL: &str = "https://www.openstreetmap.org/";

/// The default URL of the documentation for the `<map>` tag syntax.
pub const DEFAULT_SYNTAX_HELP_URL: &str =
    "https://wiki.openstreetmap.org/wiki/Simple_image_MediaWiki_Extension";

/// An error loading configuration or message data from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("could not read '{path}': {err}")]
    Io {
        /// The path of the file.
        path: String,
        /// The error.
        #[source]
        err: std::io::Error,
    },

    /// The file was not valid JSON of the expected shape.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for rendering `<map>` tags.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// The URL prefix of the static map image service. Query parameters are
    /// appended directly, so this normally ends with `?` or `&`.
    pub service_url: String,
    /// The URL of the interactive map viewer that the image links to.
    pub viewer_url: String,
    /// The URL of the page explaining the current tag syntax, linked from the
    /// notice shown to users of the legacy syntax.
    pub syntax_help_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.into(),
            viewer_url: DEFAULT_VIEWER_URL.into(),
            syntax_help_url: DEFAULT_SYNTAX_HELP_URL.into(),
        }
    }
}

impl Config {
    /// Parses configuration from a JSON object. Missing keys keep their
    /// default values.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(Into::into)
    }

    /// Reads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| LoadError::Io {
            path: path.display().to_string(),
            err,
        })?;
        Self::from_json(&text)
    }

    /// Overrides configuration values from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Overrides configuration values using the given variable lookup
    /// function. Empty values are ignored.
    #[must_use]
    pub fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        for (key, value) in [
            ("SIMPLEMAP_SERVICE_URL", &mut self.service_url),
            ("SIMPLEMAP_VIEWER_URL", &mut self.viewer_url),
            ("SIMPLEMAP_SYNTAX_HELP_URL", &mut self.syntax_help_url),
        ] {
            if let Some(new_value) = var(key)
                && !new_value.is_empty()
            {
                log::debug!("{key} overrides configured value '{value}'");
                *value = new_value;
            }
        }
        self
    }
}
