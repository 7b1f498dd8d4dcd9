//! Core geometry types for hectare.
//!
//! Everything here lives in geographic space: `x` is longitude and `y` is
//! latitude, both in degrees. Nothing is projected until the terminal map
//! draws it.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = print with `{:?}`
//! - `Clone` / `Copy` = duplicate the value (Copy only for small stack values)
//! - `PartialEq` = compare with `==`
//! - `Serialize` = turn into JSON via serde

use serde::Serialize;

/// A geographic coordinate: `x` = longitude, `y` = latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A polygon with an outer ring and optional holes.
///
/// Rings produced by the draw overlay are closed: the first vertex is
/// repeated as the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Outer boundary vertices
    pub outer: Vec<Point>,
    /// Interior rings
    pub holes: Vec<Vec<Point>>,
}

// ============================================================================
// IMPLEMENTATIONS (methods)
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a point from latitude/longitude order, the order people say
    /// coordinates out loud.
    #[inline]
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        Self { x: lng, y: lat }
    }

    #[inline]
    pub fn lng(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.y
    }

    /// Planar distance in degrees. Only meaningful for small offsets, e.g.
    /// deciding whether two sketch vertices are the same click.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Latitude within [-90, 90]. False for NaN.
    #[inline]
    pub fn has_valid_latitude(&self) -> bool {
        (-90.0..=90.0).contains(&self.y)
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    #[inline]
    pub fn is_on_globe(&self) -> bool {
        self.has_valid_latitude() && (-180.0..=180.0).contains(&self.x)
    }
}

impl Polygon {
    /// Create a simple polygon with no holes.
    pub fn new(outer: Vec<Point>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Create a polygon with holes.
    pub fn with_holes(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { outer, holes }
    }

    /// True if the outer ring repeats its first vertex at the end.
    pub fn is_closed(&self) -> bool {
        match (self.outer.first(), self.outer.last()) {
            (Some(first), Some(last)) => self.outer.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Return a copy with every ring closed.
    pub fn closed(&self) -> Polygon {
        Polygon {
            outer: close_ring(&self.outer),
            holes: self.holes.iter().map(|h| close_ring(h)).collect(),
        }
    }

    /// Number of vertices in the outer ring, not counting the closing repeat.
    pub fn vertex_count(&self) -> usize {
        if self.is_closed() {
            self.outer.len() - 1
        } else {
            self.outer.len()
        }
    }

    /// Shift every vertex by (dx, dy) degrees.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in self.outer.iter_mut().chain(self.holes.iter_mut().flatten()) {
            *p = p.offset(dx, dy);
        }
    }
}

/// Close a ring by repeating its first vertex, unless it already is closed.
pub fn close_ring(points: &[Point]) -> Vec<Point> {
    let mut ring = points.to_vec();
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

// ============================================================================
// TESTS
// ============================================================================
