//! # hectare
//!
//! Draw a polygon on a map, read off its area.
//!
//! The pieces, in the order data flows through them:
//!
//! - [`draw`] - the drawing overlay (sketch, select, move, trash)
//! - [`features`] - the overlay's feature set and its GeoJSON form
//! - [`view`] - the map view that re-reads the overlay on every draw event
//! - [`display`] - area, preview markup and vertices of the first polygon
//! - [`panel`] - read-only rendering of that display state
//!
//! ## Rust Lesson #7: Modules
//!
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level

pub mod area;
pub mod config;
pub mod display;
pub mod draw;
pub mod error;
pub mod features;
pub mod geolocation;
pub mod geometry;
pub mod panel;
pub mod svg;
pub mod view;

// Re-export common types at crate root for convenience.
pub use area::{area_hectares, geodesic_area, AreaMethod};
pub use config::AppConfig;
pub use display::DisplayState;
pub use draw::{Controls, DrawEvent, DrawLayer, DrawMode, DrawOptions, DrawOverlay};
pub use error::{Error, Result};
pub use features::{Feature, FeatureCollection};
pub use geolocation::{FixedLocation, GeolocationError, Geolocator, Unavailable};
pub use geometry::{Point, Polygon};
pub use panel::{InfoPanel, PanelContent, PolygonListing};
pub use svg::{force_fill, polygon_svg, SvgError};
pub use view::{Initialized, MapBackend, MapOptions, MapSurface, MapView, ViewSettings};
