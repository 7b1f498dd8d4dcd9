//! Terminal map surface.
//!
//! The surface keeps the camera (center + zoom) and answers "which lng/lat
//! box is visible in a canvas this many cells wide". The base layer itself is
//! ratatui's built-in world map, drawn by `ui.rs`.

use hectare::{DrawLayer, DrawOptions, MapBackend, MapOptions, MapSurface, Point};
use tracing::debug;

/// One 256px web-map tile is roughly this many terminal columns wide.
const TILE_COLUMNS: f64 = 32.0;

/// Terminal cells are about twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

/// Columns moved per pan step.
const PAN_COLUMNS: f64 = 4.0;

const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 20.0;

/// Latitude limit of web-mercator maps.
const MAX_LATITUDE: f64 = 85.0511;

#[derive(Debug, Clone)]
pub struct TerminalMap {
    options: MapOptions,
    center: Point,
    zoom: f64,
    controls: Option<DrawOptions>,
    loaded: bool,
    removed: bool,
}

impl TerminalMap {
    pub fn new(options: MapOptions) -> Self {
        Self {
            center: options.center,
            zoom: options.zoom,
            options,
            controls: None,
            loaded: false,
            removed: false,
        }
    }

    pub fn style(&self) -> &str {
        &self.options.style
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn controls(&self) -> Option<&DrawOptions> {
        self.controls.as_ref()
    }

    /// Called by the host after the first frame containing the map.
    pub fn mark_loaded(&mut self) {
        if !self.loaded && !self.removed {
            debug!(container = %self.options.container, "terminal map loaded");
            self.loaded = true;
        }
    }

    /// Longitude covered by one terminal column at the current zoom.
    pub fn degrees_per_column(&self) -> f64 {
        360.0 / (2f64.powf(self.zoom) * TILE_COLUMNS)
    }

    /// Latitude covered by one terminal row near the current center.
    pub fn degrees_per_row(&self) -> f64 {
        // Parallels bunch up towards the poles; keep rows from collapsing
        let shrink = self.center.lat().to_radians().cos().max(0.05);
        self.degrees_per_column() * CELL_ASPECT * shrink
    }

    /// Visible (x_bounds, y_bounds) for a canvas of `cols` by `rows` cells.
    pub fn bounds(&self, cols: u16, rows: u16) -> ([f64; 2], [f64; 2]) {
        let half_w = cols as f64 * self.degrees_per_column() / 2.0;
        let half_h = rows as f64 * self.degrees_per_row() / 2.0;
        let c = self.center;
        ([c.x - half_w, c.x + half_w], [c.y - half_h, c.y + half_h])
    }

    /// Move the camera by whole pan steps (positive = east / north).
    pub fn pan(&mut self, steps_x: f64, steps_y: f64) {
        let x = self.center.x + steps_x * PAN_COLUMNS * self.degrees_per_column();
        let y = self.center.y + steps_y * PAN_COLUMNS * self.degrees_per_row() / CELL_ASPECT;
        self.center = Point::new(wrap_longitude(x), y.clamp(-MAX_LATITUDE, MAX_LATITUDE));
    }

    /// Size of one pan step in degrees, for moving shapes at the same pace.
    pub fn step(&self) -> (f64, f64) {
        (
            PAN_COLUMNS * self.degrees_per_column(),
            PAN_COLUMNS * self.degrees_per_row() / CELL_ASPECT,
        )
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1.0).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 1.0).max(MIN_ZOOM);
    }

    /// Back to the center and zoom the surface was created with.
    pub fn reset_view(&mut self) {
        self.center = self.options.center;
        self.zoom = self.options.zoom;
    }
}

fn wrap_longitude(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep the sign the caller moved towards
    if wrapped == -180.0 && lng > 0.0 { 180.0 } else { wrapped }
}

impl MapSurface for TerminalMap {
    fn add_control(&mut self, options: &DrawOptions) {
        self.controls = Some(options.clone());
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn remove(&mut self) {
        debug!(container = %self.options.container, "terminal map removed");
        self.removed = true;
        self.loaded = false;
        self.controls = None;
    }
}

/// Builds terminal surfaces and interactive draw layers.
#[derive(Debug, Default)]
pub struct TerminalBackend;

impl MapBackend for TerminalBackend {
    type Surface = TerminalMap;
    type Overlay = DrawLayer;

    fn create_surface(&mut self, options: MapOptions) -> TerminalMap {
        TerminalMap::new(options)
    }

    fn create_overlay(&mut self, options: DrawOptions) -> DrawLayer {
        DrawLayer::new(options)
    }
}
