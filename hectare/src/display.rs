//! Derived display data for the first drawn polygon.
//!
//! [`DisplayState`] is always built in one go from one snapshot of the draw
//! overlay. Its fields are private, so the area, the markup and the vertex
//! list can never disagree about whether a polygon exists:
//!
//! ```text
//! area_hectares > 0  <=>  !vertices.is_empty()  <=>  !svg_markup.is_empty()
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::area::{self, AreaMethod};
use crate::features::FeatureCollection;
use crate::geometry::Point;
use crate::svg::polygon_svg;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DisplayState {
    area_hectares: f64,
    svg_markup: String,
    vertices: Vec<Vec<Point>>,
}

impl DisplayState {
    /// The state before anything is drawn, and after the last polygon is
    /// deleted.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Recompute from a full snapshot of drawn features.
    ///
    /// Only the first feature is looked at, however many exist. A first
    /// polygon with no measurable area (collinear, or fewer than three
    /// distinct vertices) yields the empty state.
    pub fn from_features(snapshot: &FeatureCollection, method: AreaMethod) -> Self {
        let Some(feature) = snapshot.first() else {
            debug!("no features drawn");
            return Self::empty();
        };

        if snapshot.len() > 1 {
            warn!(
                features = snapshot.len(),
                using = %feature.id,
                "more than one polygon drawn; only the first is measured"
            );
        }

        let square_meters = area::geodesic_area(&feature.polygon, method);
        let area_hectares = area::square_meters_to_hectares(square_meters);
        if !(area_hectares > 0.0) {
            warn!(id = %feature.id, "first polygon has no area");
            return Self::empty();
        }

        let ring = feature.polygon.outer.clone();
        let svg_markup = polygon_svg(&ring);
        debug!(
            id = %feature.id,
            square_meters,
            area_hectares,
            vertices = ring.len(),
            "display state recomputed"
        );

        Self {
            area_hectares,
            svg_markup,
            vertices: vec![ring],
        }
    }

    pub fn area_hectares(&self) -> f64 {
        self.area_hectares
    }

    pub fn svg_markup(&self) -> &str {
        &self.svg_markup
    }

    /// Zero or one ring: the first polygon's outer boundary.
    pub fn vertices(&self) -> &[Vec<Point>] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
