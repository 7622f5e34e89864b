//! The `<map>` extension tag.
//! <https://wiki.openstreetmap.org/wiki/Simple_image_MediaWiki_Extension>
//!
//! This tag shows a static map image for a latitude, longitude, and zoom
//! level, linked to the interactive map at the same location. The image itself
//! is generated by an external service; all this tag does is validate the
//! parameters and build the URLs.
//!
//! Two syntaxes are accepted. The current one uses attributes:
//!
//! ```text
//! <map lat=51.485 lon=-0.15 z=11 w=300 h=200 format=jpeg />
//! ```
//!
//! The legacy one puts pipe-separated parameters in the tag body:
//!
//! ```text
//! <map>lat=51.485|lon=-0.15|z=11|w=300|h=200</map>
//! ```
//!
//! Attributes win over body parameters when both are given. Anything else in
//! the body is an error, and so is a body with fewer than three `|`-separated
//! parts, which means that a legacy body with only two parameters is rejected
//! too. That is how the tag has always behaved, so it stays.

use super::{ExtensionTag, Result};
use crate::{messages::Messages, php, renderer::State};
use core::fmt::{self, Write as _};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::{borrow::Cow, collections::HashMap};


/// Characters in a query string value which have to be encoded, both to keep
/// the query string intact and to be safe inside a quoted HTML attribute.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>');

/// The number of `|`-separated body parts needed before the body counts as
/// legacy parameters instead of stray inner text.
const MIN_LEGACY_TOKENS: usize = 3;

/// The default image width, in pixels.
const DEFAULT_WIDTH: &str = "450";
/// The default image height, in pixels.
const DEFAULT_HEIGHT: &str = "320";
/// The default image format.
const DEFAULT_FORMAT: &str = "jpeg";

/// The smallest allowed image width or height.
const MIN_SIZE: f64 = 100.0;
/// The largest allowed image width or height.
const MAX_SIZE: f64 = 1000.0;
/// The largest zoom level the image service renders.
const MAX_ZOOM: f64 = 17.0;

/// The error text for stray inner text. There is no message key for this.
const UNEXPECTED_BODY_TEXT: &str =
    "map tag contents. We expect the map tag to have no inner text";

/// The error text for a requested marker. There is no message key for this.
const MARKER_DISABLED_TEXT: &str =
    "marker support is deactivated on this wiki pending discussions about wiki syntax";

/// A tag parameter and the places it may be given, in order of precedence.
#[derive(Clone, Copy, Debug)]
struct Param {
    /// The name of the tag attribute.
    attribute: &'static str,
    /// The name of the legacy body parameter, if there is one.
    legacy: Option<&'static str>,
}

impl Param {
    /// Latitude.
    const LAT: Self = Self::new("lat", Some("lat"));
    /// Longitude.
    const LON: Self = Self::new("lon", Some("lon"));
    /// Zoom level.
    const ZOOM: Self = Self::new("z", Some("z"));
    /// The alternate attribute name for the zoom level, used only when
    /// [`Self::ZOOM`] is empty.
    const ZOOM_ALIAS: Self = Self::new("zoom", None);
    /// Image width.
    const WIDTH: Self = Self::new("w", Some("w"));
    /// Image height.
    const HEIGHT: Self = Self::new("h", Some("h"));
    /// Image format.
    const FORMAT: Self = Self::new("format", None);
    /// Map marker.
    const MARKER: Self = Self::new("marker", None);

    /// Creates a new parameter.
    const fn new(attribute: &'static str, legacy: Option<&'static str>) -> Self {
        Self { attribute, legacy }
    }
}

/// Parameters given in the legacy `key=value|key=value` body syntax.
#[derive(Debug, Default)]
struct LegacyParams<'a> {
    /// The parameters, by name. Values are HTML-escaped.
    params: HashMap<&'a str, Cow<'a, str>>,
    /// The number of `|`-separated parts in the body, including empty ones.
    /// An empty body has one part.
    tokens: usize,
}

impl<'a> LegacyParams<'a> {
    /// Parses legacy parameters from a tag body.
    fn parse(body: &'a str) -> Self {
        let mut params = HashMap::new();
        let mut tokens = 0;
        for token in body.split('|') {
            tokens += 1;
            let token = php::trim(token);
            if token.is_empty() {
                continue;
            }

            if let Some((key, value)) = token.split_once('=') {
                params.insert(key, php::htmlspecialchars(php::trim(value)));
            } else {
                params.insert(token, Cow::Borrowed("true"));
            }
        }

        Self { params, tokens }
    }

    /// Returns the value of the legacy parameter with the given name.
    fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|value| &**value)
    }
}

/// A fully resolved `<map>` request.
#[derive(Debug)]
struct MapRequest<'a> {
    /// Latitude, in decimal degrees.
    lat: &'a str,
    /// Longitude, in decimal degrees.
    lon: &'a str,
    /// Zoom level.
    zoom: &'a str,
    /// Image width, in pixels.
    width: Cow<'a, str>,
    /// Image height, in pixels.
    height: Cow<'a, str>,
    /// Image format.
    format: &'a str,
    /// Whether a marker was requested.
    marker: bool,
    /// Whether the legacy body syntax was used.
    legacy_syntax: bool,
    /// Whether the tag had any non-whitespace inner text.
    has_body: bool,
    /// The number of legacy body parts.
    legacy_tokens: usize,
}

impl<'a> MapRequest<'a> {
    /// Resolves a request from tag attributes and legacy body parameters,
    /// applying defaults.
    fn resolve(arguments: &ExtensionTag<'a>, legacy: &'a LegacyParams<'a>) -> Self {
        let lookup = |param: Param| {
            arguments
                .get(param.attribute)
                .or_else(|| param.legacy.and_then(|name| legacy.get(name)))
                .unwrap_or_default()
        };

        let mut zoom = lookup(Param::ZOOM);
        if zoom.is_empty() {
            zoom = lookup(Param::ZOOM_ALIAS);
        }

        let marker = lookup(Param::MARKER);

        Self {
            lat: lookup(Param::LAT),
            lon: lookup(Param::LON),
            zoom,
            width: pixels(or_default(lookup(Param::WIDTH), DEFAULT_WIDTH)),
            height: pixels(or_default(lookup(Param::HEIGHT), DEFAULT_HEIGHT)),
            format: or_default(lookup(Param::FORMAT), DEFAULT_FORMAT),
            marker: !marker.is_empty() && marker != "0",
            legacy_syntax: legacy.tokens >= MIN_LEGACY_TOKENS,
            has_body: !php::trim(arguments.body()).is_empty(),
            legacy_tokens: legacy.tokens,
        }
    }

    /// Validates the request.
    ///
    /// A requested marker or stray body text, plus any missing required
    /// values, are all reported together. Otherwise, only the first problem
    /// with the values is reported.
    fn validate(&self) -> Result<(), Vec<MapError>> {
        let mut errors = Vec::new();

        if self.marker {
            errors.push(MapError::MarkerDisabled);
        } else if self.has_body && self.legacy_tokens < MIN_LEGACY_TOKENS {
            errors.push(MapError::UnexpectedBody);
        }

        for (field, value) in [
            (Field::Lat, self.lat),
            (Field::Lon, self.lon),
            (Field::Zoom, self.zoom),
        ] {
            if value.is_empty() {
                errors.push(MapError::Missing(field));
            }
        }

        if errors.is_empty() {
            self.check_values().map_err(|err| vec![err])
        } else {
            Err(errors)
        }
    }

    /// Checks that all the values are numbers within range. The order of the
    /// checks decides which error is reported when there is more than one
    /// problem.
    #[allow(clippy::float_cmp)]
    fn check_values(&self) -> Result<(), MapError> {
        let number = |field, value: &str| {
            php::numeric(value).ok_or_else(|| MapError::NotNumeric(field, value.to_string()))
        };

        let width = number(Field::Width, &*self.width)?;
        let height = number(Field::Height, &*self.height)?;
        let zoom = number(Field::Zoom, self.zoom)?;
        let lat = number(Field::Lat, self.lat)?;
        let lon = number(Field::Lon, self.lon)?;

        [
            (width > MAX_SIZE, MapError::TooBig(Field::Width)),
            (width < MIN_SIZE, MapError::TooSmall(Field::Width)),
            (height > MAX_SIZE, MapError::TooBig(Field::Height)),
            (height < MIN_SIZE, MapError::TooSmall(Field::Height)),
            (lat > 90.0, MapError::TooBig(Field::Lat)),
            (lat < -90.0, MapError::TooSmall(Field::Lat)),
            (lon > 180.0, MapError::TooBig(Field::Lon)),
            (lon < -180.0, MapError::TooSmall(Field::Lon)),
            (zoom < 0.0, MapError::TooSmall(Field::Zoom)),
            (zoom == 18.0, MapError::Zoom18),
            (zoom > MAX_ZOOM, MapError::TooBig(Field::Zoom)),
        ]
        .into_iter()
        .find_map(|(failed, err)| failed.then_some(err))
        .map_or(Ok(()), Err)
    }
}

/// Returns `default` if `value` is empty.
#[inline]
fn or_default<'a>(value: &'a str, default: &'static str) -> &'a str {
    if value.is_empty() { default } else { value }
}

/// Strips a `px` unit from a size, converting the rest to an integer.
fn pixels(value: &str) -> Cow<'_, str> {
    value
        .strip_suffix("px")
        .map_or(Cow::Borrowed(value), |n| Cow::Owned(php::intval(n).to_string()))
}

/// A numeric `<map>` value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Field {
    /// Latitude.
    Lat,
    /// Longitude.
    Lon,
    /// Zoom level.
    Zoom,
    /// Image width.
    Width,
    /// Image height.
    Height,
}

impl Field {
    /// The name of the field as used in message keys.
    fn key(self) -> &'static str {
        match self {
            Field::Lat => "lat",
            Field::Lon => "lon",
            Field::Zoom => "zoom",
            Field::Width => "width",
            Field::Height => "height",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Lat => "latitude",
            Field::Lon => "longitude",
            Field::Zoom => "zoom level",
            Field::Width => "width",
            Field::Height => "height",
        })
    }
}

/// A `<map>` validation error.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
enum MapError {
    /// The tag had inner text which was not legacy parameters.
    #[error("unexpected inner text")]
    UnexpectedBody,

    /// A marker was requested.
    #[error("markers are disabled")]
    MarkerDisabled,

    /// A required value was missing.
    #[error("missing {0}")]
    Missing(Field),

    /// A value was not a number.
    #[error("{0} '{1}' is not a number")]
    NotNumeric(Field, String),

    /// A value was above its allowed range.
    #[error("{0} is too big")]
    TooBig(Field),

    /// A value was below its allowed range.
    #[error("{0} is too small")]
    TooSmall(Field),

    /// The zoom level was 18, which the image service does not render.
    #[error("zoom level 18 is not available")]
    Zoom18,
}

impl MapError {
    /// Returns the user-facing message for this error.
    fn message(&self, messages: &dyn Messages) -> String {
        match self {
            Self::UnexpectedBody => UNEXPECTED_BODY_TEXT.into(),
            Self::MarkerDisabled => MARKER_DISABLED_TEXT.into(),
            Self::Missing(field) => {
                messages.message(&format!("simplemap_{}missing", field.key()), &[])
            }
            Self::NotNumeric(field, value) => {
                // Body parameter values are already escaped, attribute values
                // are not
                let value = html_escape::encode_text(&html_escape::decode_html_entities(value))
                    .into_owned();
                messages.message(&format!("simplemap_{}nan", field.key()), &[value.as_str()])
            }
            Self::TooBig(field) => messages.message(&format!("simplemap_{}big", field.key()), &[]),
            Self::TooSmall(field) => {
                messages.message(&format!("simplemap_{}small", field.key()), &[])
            }
            Self::Zoom18 => messages.message("simplemap_zoom18", &[]),
        }
    }
}

/// The `<map>` extension tag.
pub(super) fn simple_map(
    out: &mut String,
    state: &State<'_>,
    arguments: &ExtensionTag<'_>,
) -> Result {
    let legacy = LegacyParams::parse(arguments.body());
    let request = MapRequest::resolve(arguments, &legacy);
    log::trace!("<map>: {request:?}");

    match request.validate() {
        Ok(()) => render_map(out, state, &request),
        Err(errors) => {
            if log::log_enabled!(log::Level::Debug) {
                let reasons = errors.iter().map(ToString::to_string).collect::<Vec<_>>();
                log::debug!("<map>: rejected: {}", reasons.join("; "));
            }
            render_error(out, state, arguments.body(), &errors)
        }
    }
}

/// Renders the linked map image.
fn render_map(out: &mut String, state: &State<'_>, request: &MapRequest<'_>) -> Result {
    let lat = request.lat.trim_ascii();
    let lon = request.lon.trim_ascii();
    let zoom = request.zoom.trim_ascii();
    let width = request.width.trim_ascii();
    let height = request.height.trim_ascii();
    let title = state.messages.message("simplemap_osmtext", &[]);

    write!(
        out,
        r#"<a href="{viewer}?lat={lat}&lon={lon}&zoom={zoom}" title="{title}">"#,
        viewer = state.config.viewer_url,
        title = html_escape::encode_double_quoted_attribute(&title),
    )?;
    write!(
        out,
        r#"<img src="{service}lat={lat}&long={lon}&z={zoom}&w={width}&h={height}&format={format}" width="{width}" height="{height}" border="0">"#,
        service = state.config.service_url,
        format = utf8_percent_encode(request.format, QUERY_VALUE),
    )?;
    out.push_str("</a>");

    if request.legacy_syntax {
        write!(
            out,
            r#"<div style="font-size:0.8em;"><i>please change to <a href="{}">new syntax</a></i></div>"#,
            state.config.syntax_help_url
        )?;
    }

    Ok(())
}

/// Renders validation errors followed by the original tag body.
fn render_error(out: &mut String, state: &State<'_>, body: &str, errors: &[MapError]) -> Result {
    write!(
        out,
        r#"<span class="error">{} "#,
        state.messages.message("simplemap_maperror", &[])
    )?;
    for error in errors {
        out.push_str(&error.message(state.messages));
    }
    write!(out, "</span><br />{}", php::htmlspecialchars(body))?;
    Ok(())
}
