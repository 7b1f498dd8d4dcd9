//! Geodesic polygon area.
//!
//! Two formulas are offered:
//!
//! - **Spherical** (default): Chamberlain & Duquette's ring integral on a
//!   sphere with the WGS84 equatorial radius. This is the formula browser
//!   mapping toolkits use, so numbers match what a web map would report.
//! - **Ellipsoidal**: Karney's geodesics on the WGS84 ellipsoid. Slightly
//!   more accurate, slightly slower.
//!
//! Both come from the `geo` crate; this module converts our rings into
//! `geo` types, orients them and picks the formula.

use geo::orient::{Direction, Orient};
use geo::{ChamberlainDuquetteArea, Coord, GeodesicArea, LineString};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Polygon};

/// Square meters in one hectare.
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Which earth model to measure on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaMethod {
    #[default]
    Spherical,
    Ellipsoidal,
}

impl AreaMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "spherical" | "sphere" => Some(AreaMethod::Spherical),
            "ellipsoidal" | "ellipsoid" | "karney" => Some(AreaMethod::Ellipsoidal),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AreaMethod::Spherical => "spherical",
            AreaMethod::Ellipsoidal => "ellipsoidal",
        }
    }
}

fn to_line_string(ring: &[Point]) -> LineString<f64> {
    ring.iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect::<Vec<_>>()
        .into()
}

/// Unsigned area of one ring in square meters, whatever its winding.
fn ring_area(ring: &[Point], method: AreaMethod) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    // Karney's unsigned area of a clockwise ring is the rest of the globe
    let ring = geo::Polygon::new(to_line_string(ring), vec![]).orient(Direction::Default);
    match method {
        AreaMethod::Spherical => ring.chamberlain_duquette_unsigned_area(),
        AreaMethod::Ellipsoidal => ring.geodesic_area_unsigned(),
    }
}

/// Geodesic area of a polygon in square meters.
///
/// Each ring is measured on its own and holes are subtracted by magnitude,
/// so the result does not depend on how the rings are wound. Rings with
/// fewer than three vertices have no area.
pub fn geodesic_area(polygon: &Polygon, method: AreaMethod) -> f64 {
    if polygon.outer.len() < 3 {
        return 0.0;
    }

    let holes: f64 = polygon.holes.iter().map(|h| ring_area(h, method)).sum();
    (ring_area(&polygon.outer, method) - holes).max(0.0)
}

#[inline]
pub fn square_meters_to_hectares(square_meters: f64) -> f64 {
    square_meters / SQUARE_METERS_PER_HECTARE
}

/// Geodesic area of a polygon in hectares.
pub fn area_hectares(polygon: &Polygon, method: AreaMethod) -> f64 {
    square_meters_to_hectares(geodesic_area(polygon, method))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree_square() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ])
    }

    #[test]
    fn one_degree_square_at_equator() {
        // R^2 * (pi/180) * sin(1 deg) with R = 6378137 m
        let r: f64 = 6_378_137.0;
        let expected = r * r * 1.0_f64.to_radians() * 1.0_f64.to_radians().sin();

        let area = geodesic_area(&degree_square(), AreaMethod::Spherical);
        let relative = (area - expected).abs() / expected;
        assert!(relative < 5e-3, "expected ~{} m², got {}", expected, area);
    }

    #[test]
    fn hectares_are_square_meters_over_ten_thousand() {
        let poly = degree_square();
        let m2 = geodesic_area(&poly, AreaMethod::Spherical);
        assert_eq!(area_hectares(&poly, AreaMethod::Spherical), m2 / 10_000.0);
        // A 1°x1° equatorial cell is a bit over 1.2 million hectares
        let ha = area_hectares(&poly, AreaMethod::Spherical);
        assert!(ha > 1_200_000.0 && ha < 1_250_000.0, "got {} ha", ha);
    }

    #[test]
    fn winding_does_not_change_area() {
        let mut reversed = degree_square();
        reversed.outer.reverse();
        let a = geodesic_area(&degree_square(), AreaMethod::Spherical);
        let b = geodesic_area(&reversed, AreaMethod::Spherical);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn ellipsoid_and_sphere_agree_closely() {
        let sphere = geodesic_area(&degree_square(), AreaMethod::Spherical);
        let ellipsoid = geodesic_area(&degree_square(), AreaMethod::Ellipsoidal);
        let relative = (sphere - ellipsoid).abs() / ellipsoid;
        assert!(relative < 0.01, "sphere {} vs ellipsoid {}", sphere, ellipsoid);
    }

    fn square_hole() -> Vec<Point> {
        vec![
            Point::new(0.25, 0.25),
            Point::new(0.75, 0.25),
            Point::new(0.75, 0.75),
            Point::new(0.25, 0.75),
            Point::new(0.25, 0.25),
        ]
    }

    #[test]
    fn holes_subtract() {
        let outer = degree_square().outer;
        let mut same_winding_hole = square_hole();
        same_winding_hole.reverse();

        for method in [AreaMethod::Spherical, AreaMethod::Ellipsoidal] {
            let full = geodesic_area(&degree_square(), method);
            let inner = geodesic_area(&Polygon::new(square_hole()), method);
            // Opposite winding (the RFC 7946 layout) and same winding agree
            for hole in [square_hole(), same_winding_hole.clone()] {
                let total = geodesic_area(&Polygon::with_holes(outer.clone(), vec![hole]), method);
                assert!(
                    (total - (full - inner)).abs() / full < 1e-9,
                    "{}: {} vs {}",
                    method.name(),
                    total,
                    full - inner
                );
            }
        }
    }

    #[test]
    fn ellipsoidal_winding_does_not_change_area() {
        let mut ccw = degree_square();
        ccw.outer.reverse();
        let cw = geodesic_area(&degree_square(), AreaMethod::Ellipsoidal);
        let ccw = geodesic_area(&ccw, AreaMethod::Ellipsoidal);
        assert!((cw - ccw).abs() < 1.0, "cw {} vs ccw {}", cw, ccw);
        let ha = square_meters_to_hectares(cw);
        assert!(ha > 1_200_000.0 && ha < 1_250_000.0, "got {} ha", ha);
    }

    #[test]
    fn too_few_points_have_no_area() {
        let line = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(geodesic_area(&line, AreaMethod::Spherical), 0.0);
        assert_eq!(geodesic_area(&Polygon::new(vec![]), AreaMethod::Ellipsoidal), 0.0);
    }

    #[test]
    fn method_names_round_trip() {
        for method in [AreaMethod::Spherical, AreaMethod::Ellipsoidal] {
            assert_eq!(AreaMethod::from_name(method.name()), Some(method));
        }
        assert_eq!(AreaMethod::from_name("KARNEY"), Some(AreaMethod::Ellipsoidal));
        assert_eq!(AreaMethod::from_name("flat"), None);
    }
}
