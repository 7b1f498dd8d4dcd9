//! The info panel: a read-only view of [`DisplayState`].
//!
//! [`InfoPanel::render`] turns the state into [`PanelContent`], which hosts
//! then draw however suits them (terminal widgets, HTML, plain text, JSON).
//! The panel never changes the state it is given.

use serde::Serialize;

use crate::display::DisplayState;
use crate::error::Result;
use crate::svg::{self, PANEL_FILL};

/// Shown when nothing has been drawn.
pub const NOTHING_SELECTED: &str = "No area has been selected";

/// Panel heading.
pub const TITLE: &str = "Selected Area Information";

/// Heading above the vertex listing.
pub const COORDINATES_TITLE: &str = "Polygon Coordinates";

/// One ring's vertices, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonListing {
    /// "Polygon 1", "Polygon 2", ... (1-indexed)
    pub label: String,
    /// "Lat: {lat}, Lng: {lng}", one per vertex, in ring order
    pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PanelContent {
    Empty {
        message: String,
    },
    Selected {
        area_hectares: f64,
        area_label: String,
        /// Preview markup with the fill colour forced to the panel colour
        svg: String,
        polygons: Vec<PolygonListing>,
    },
}

pub struct InfoPanel;

impl InfoPanel {
    /// Render the panel for a display state.
    ///
    /// Fails only if the state's markup is not well-formed XML, which the
    /// display step never produces.
    pub fn render(state: &DisplayState) -> Result<PanelContent> {
        if state.area_hectares() == 0.0 {
            return Ok(PanelContent::Empty {
                message: NOTHING_SELECTED.to_string(),
            });
        }

        let svg = svg::force_fill(state.svg_markup(), PANEL_FILL)?;

        let polygons = state
            .vertices()
            .iter()
            .enumerate()
            .map(|(index, ring)| PolygonListing {
                label: format!("Polygon {}", index + 1),
                points: ring
                    .iter()
                    .map(|p| format!("Lat: {}, Lng: {}", p.lat(), p.lng()))
                    .collect(),
            })
            .collect();

        Ok(PanelContent::Selected {
            area_hectares: state.area_hectares(),
            area_label: format!("Calculated area: {} hectare", state.area_hectares()),
            svg,
            polygons,
        })
    }
}

impl PanelContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, PanelContent::Empty { .. })
    }

    /// Plain text, one line per row of the panel.
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![TITLE.to_string()];
        match self {
            PanelContent::Empty { message } => out.push(message.clone()),
            PanelContent::Selected {
                area_label,
                polygons,
                ..
            } => {
                out.push(area_label.clone());
                out.push(COORDINATES_TITLE.to_string());
                for polygon in polygons {
                    out.push(format!("{}:", polygon.label));
                    out.extend(polygon.points.iter().map(|p| format!("  {}", p)));
                }
            }
        }
        out
    }

    /// The sidebar as an HTML fragment, with the preview inlined.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"info-panel\">\n");
        html.push_str(&format!("  <h2>{}</h2>\n", escape_text(TITLE)));

        match self {
            PanelContent::Empty { message } => {
                html.push_str(&format!("  <p>{}</p>\n", escape_text(message)));
            }
            PanelContent::Selected {
                area_label,
                svg,
                polygons,
                ..
            } => {
                html.push_str(&format!("  <p>{}</p>\n", escape_text(area_label)));
                html.push_str(&format!("  <div>{}</div>\n", svg));
                html.push_str(&format!("  <h3>{}</h3>\n", escape_text(COORDINATES_TITLE)));
                html.push_str("  <ul>\n");
                for polygon in polygons {
                    html.push_str(&format!(
                        "    <li><strong>{}:</strong>\n      <ul>\n",
                        escape_text(&polygon.label)
                    ));
                    for point in &polygon.points {
                        html.push_str(&format!("        <li>{}</li>\n", escape_text(point)));
                    }
                    html.push_str("      </ul>\n    </li>\n");
                }
                html.push_str("  </ul>\n");
            }
        }

        html.push_str("</div>\n");
        html
    }
}

fn escape_text(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}
