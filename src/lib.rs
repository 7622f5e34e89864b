//! Rendering for the OpenStreetMap `<map>` Wikitext extension tag.
//!
//! ```
//! use simplemap_rs::{Renderer, Tag};
//!
//! let tag = Tag::parse("<map lat=51.485 lon=-0.15 z=11 w=300 h=200 />").unwrap();
//! let html = Renderer::default().render(&tag).unwrap();
//! assert!(html.starts_with(r#"<a href="https://www.openstreetmap.org/?lat=51.485"#));
//! ```

pub mod config;
pub mod messages;
mod php;
pub mod renderer;
pub mod tag;

pub use config::Config;
pub use messages::{Dictionary, Messages};
pub use renderer::{Attributes, Renderer};
pub use tag::Tag;
