//! Where the map starts.
//!
//! A [`Geolocator`] reports the device position once. Failure is never
//! fatal: the map opens at a fallback center instead.

use std::io;

use tracing::{info, warn};

use crate::geometry::Point;

/// Default center when no position is available (lng, lat).
pub const FALLBACK_CENTER: Point = Point { x: -74.5, y: 40.0 };

#[derive(Debug, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is unavailable")]
    Unavailable,
    #[error("timed out waiting for a position fix")]
    Timeout,
    #[error("geolocation I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("geolocation protocol error: {0}")]
    Protocol(String),
}

/// A source of the device's current position.
pub trait Geolocator {
    fn locate(&mut self) -> Result<Point, GeolocationError>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub Point);

impl Geolocator for FixedLocation {
    fn locate(&mut self) -> Result<Point, GeolocationError> {
        Ok(self.0)
    }
}

/// Never has a position; the map always opens at the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl Geolocator for Unavailable {
    fn locate(&mut self) -> Result<Point, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

impl<G: Geolocator + ?Sized> Geolocator for Box<G> {
    fn locate(&mut self) -> Result<Point, GeolocationError> {
        (**self).locate()
    }
}

/// Pick the initial map center from a geolocation outcome.
pub fn resolve_center(position: Result<Point, GeolocationError>, fallback: Point) -> Point {
    match position {
        Ok(p) if p.lat().is_finite() && p.lng().is_finite() => {
            info!(lat = p.lat(), lng = p.lng(), "using device position");
            p
        }
        Ok(p) => {
            warn!(lat = p.lat(), lng = p.lng(), "ignoring non-finite position");
            fallback
        }
        Err(e) => {
            warn!(error = %e, lat = fallback.lat(), lng = fallback.lng(), "error getting user location; using default center");
            fallback
        }
    }
}

/// Parse "lat,lng" as typed on a command line.
pub fn parse_lat_lng(text: &str) -> Option<Point> {
    let (lat, lng) = text.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some(Point::from_lat_lng(lat, lng))
}
