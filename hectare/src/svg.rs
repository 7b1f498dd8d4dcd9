//! SVG markup for drawn polygons.
//!
//! Two jobs live here:
//!
//! - building the schematic `<polygon>` preview from a ring
//! - forcing every fill colour in a piece of markup to one display colour
//!
//! ## Coordinates are not projected
//!
//! Ring coordinates go into the `points` attribute as-is, inside a fixed
//! 100x100 viewBox. Longitudes and latitudes are degrees, so most shapes land
//! partly or entirely outside the box. The preview is schematic only.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::geometry::Point;

/// Side length of the preview viewBox.
pub const VIEWBOX_SIZE: u32 = 100;

/// Style baked into the preview by the draw step.
pub const SKETCH_STYLE: &str = "fill:lime;stroke:purple;stroke-width:1";

/// Fill colour the info panel forces onto the preview.
pub const PANEL_FILL: &str = "black";

/// Error type for SVG rewriting.
///
/// ## Rust Lesson #20: Error Handling
///
/// `thiserror` writes the `Display` and `std::error::Error` impls from the
/// `#[error(...)]` attributes, so each variant states its message once.
#[derive(Debug, thiserror::Error)]
pub enum SvgError {
    #[error("SVG parse error: {0}")]
    ParseError(String),
    #[error("SVG write error: {0}")]
    WriteError(String),
}

/// Format a ring as an SVG `points` attribute: `"x,y x,y ..."`.
///
/// Numbers use Rust's default `f64` formatting, so `0.0` prints as `0` and
/// `-74.5` as `-74.5`.
pub fn points_attribute(ring: &[Point]) -> String {
    ring.iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the schematic preview for a ring.
///
/// Returns an empty string for an empty ring so callers can treat "no markup"
/// and "no polygon" the same way.
pub fn polygon_svg(ring: &[Point]) -> String {
    if ring.is_empty() {
        return String::new();
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}"><polygon points="{points}" style="{style}" /></svg>"#,
        size = VIEWBOX_SIZE,
        points = points_attribute(ring),
        style = SKETCH_STYLE,
    )
}

/// Rewrite every fill colour in `markup` to `color`.
///
/// Covers both forms a fill can take:
/// - presentation attributes: `fill="lime"`
/// - style declarations: `style="fill:lime;stroke:purple"`
///
/// Everything else (elements, other attributes, text) is re-emitted as read.
pub fn force_fill(markup: &str, color: &str) -> Result<String, SvgError> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::new());

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SvgError::ParseError(e.to_string()))?;

        let rewritten = match event {
            Event::Eof => break,
            Event::Start(start) => Event::Start(with_forced_fill(&start, color)?),
            Event::Empty(start) => Event::Empty(with_forced_fill(&start, color)?),
            other => other,
        };

        writer
            .write_event(rewritten)
            .map_err(|e| SvgError::WriteError(e.to_string()))?;
    }

    String::from_utf8(writer.into_inner()).map_err(|e| SvgError::WriteError(e.to_string()))
}

fn with_forced_fill(start: &BytesStart, color: &str) -> Result<BytesStart<'static>, SvgError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| SvgError::ParseError(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SvgError::ParseError(e.to_string()))?;

        let value: Cow<str> = match key.as_str() {
            "fill" => Cow::Borrowed(color),
            "style" => Cow::Owned(force_style_fill(&value, color)),
            _ => value,
        };
        out.push_attribute((key.as_str(), value.as_ref()));
    }

    Ok(out)
}

/// Replace the `fill` declaration of an inline style, keeping the rest.
fn force_style_fill(style: &str, color: &str) -> String {
    style
        .split(';')
        .map(|decl| match decl.split_once(':') {
            Some((prop, _)) if prop.trim().eq_ignore_ascii_case("fill") => {
                format!("{}:{}", prop, color)
            }
            _ => decl.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

// ============================================================================
// TESTS
// ============================================================================
