//! Drawn features and their GeoJSON form.
//!
//! The draw overlay owns a [`FeatureCollection`]; everyone else gets a
//! snapshot of it through [`crate::draw::DrawOverlay::get_all`]. The
//! collection keeps features in creation order, which is what makes "the
//! first feature" a stable notion.

use geojson::feature::Id;
use geojson::{GeoJson, Geometry, Value};
use tracing::warn;

use crate::error::Result;
use crate::geometry::{Point, Polygon};

/// A single drawn shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: String,
    pub polygon: Polygon,
}

/// All shapes currently on the map, oldest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl Feature {
    pub fn new(id: impl Into<String>, polygon: Polygon) -> Self {
        Self {
            id: id.into(),
            polygon,
        }
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The feature everything downstream looks at.
    #[inline]
    pub fn first(&self) -> Option<&Feature> {
        self.features.first()
    }

    /// Parse a GeoJSON document.
    ///
    /// Accepts a FeatureCollection, a single Feature, or a bare Geometry.
    /// Only Polygon geometries become features; anything else is skipped so
    /// that index 0 is always a polygon. So is a polygon with any position
    /// off the globe.
    pub fn from_geojson_str(input: &str) -> Result<Self> {
        let geojson: GeoJson = input.parse()?;

        let entries: Vec<(Option<Id>, Option<Geometry>)> = match geojson {
            GeoJson::FeatureCollection(fc) => fc
                .features
                .into_iter()
                .map(|f| (f.id, f.geometry))
                .collect(),
            GeoJson::Feature(f) => vec![(f.id, f.geometry)],
            GeoJson::Geometry(g) => vec![(None, Some(g))],
        };

        let mut features = Vec::new();
        for (index, (id, geometry)) in entries.into_iter().enumerate() {
            let Some(geometry) = geometry else {
                warn!(index, "skipping feature without geometry");
                continue;
            };
            match polygon_from_value(&geometry.value) {
                Some(polygon) if !polygon_on_globe(&polygon) => {
                    warn!(index, "skipping polygon with coordinates off the globe");
                }
                Some(polygon) => {
                    let id = match id {
                        Some(Id::String(s)) => s,
                        Some(Id::Number(n)) => n.to_string(),
                        None => format!("feature-{}", index + 1),
                    };
                    features.push(Feature::new(id, polygon));
                }
                None => {
                    warn!(index, kind = value_kind(&geometry.value), "skipping non-polygon feature");
                }
            }
        }

        Ok(Self { features })
    }

    /// Serialize as a GeoJSON FeatureCollection.
    pub fn to_geojson(&self) -> GeoJson {
        let features = self
            .features
            .iter()
            .map(|f| geojson::Feature {
                bbox: None,
                geometry: Some(Geometry::new(polygon_to_value(&f.polygon))),
                id: Some(Id::String(f.id.clone())),
                properties: None,
                foreign_members: None,
            })
            .collect();

        GeoJson::FeatureCollection(geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> String {
        self.to_geojson().to_string()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Vec<Point> {
    positions
        .iter()
        .filter(|pos| pos.len() >= 2)
        .map(|pos| Point::new(pos[0], pos[1]))
        .collect()
}

fn polygon_from_value(value: &Value) -> Option<Polygon> {
    match value {
        Value::Polygon(rings) => {
            let mut rings = rings.iter().map(|r| ring_from_positions(r));
            let outer = rings.next()?;
            Some(Polygon::with_holes(outer, rings.collect()))
        }
        _ => None,
    }
}

fn polygon_on_globe(polygon: &Polygon) -> bool {
    polygon
        .outer
        .iter()
        .chain(polygon.holes.iter().flatten())
        .all(Point::is_on_globe)
}

fn polygon_to_value(polygon: &Polygon) -> Value {
    let ring = |points: &[Point]| -> Vec<Vec<f64>> {
        points.iter().map(|p| vec![p.x, p.y]).collect()
    };

    let mut rings = vec![ring(&polygon.outer)];
    rings.extend(polygon.holes.iter().map(|h| ring(h)));
    Value::Polygon(rings)
}
