//! The map view: owns the map surface and keeps the display state in sync
//! with what the user has drawn.
//!
//! ## Lifecycle
//!
//! ```text
//! new ──initialize──► surface created ──surface_loaded──► ready ──teardown──► gone
//!                                                          │
//!                                                 on_draw_changed (any number)
//! ```
//!
//! Draw events are only listened to once the surface reports it has loaded;
//! anything earlier is dropped. Every draw event re-reads the overlay's full
//! feature set instead of trusting what the event says changed.
//!
//! ## Rust Lesson #25: Associated types
//!
//! [`MapBackend`] names *two* related types, the surface and the overlay it
//! builds. `MapView<B>` then stores `Option<B::Surface>` without knowing
//! what a surface actually is. The terminal host plugs in a ratatui canvas;
//! tests plug in a struct that just records calls.

use tracing::{debug, info};

use crate::area::AreaMethod;
use crate::config::AppConfig;
use crate::display::DisplayState;
use crate::draw::{DrawEvent, DrawOptions, DrawOverlay};
use crate::geolocation::{self, GeolocationError, FALLBACK_CENTER};
use crate::geometry::Point;

/// The only base layer offered.
pub const SATELLITE_STYLE: &str = "satellite-v9";

/// Starting zoom level.
pub const DEFAULT_ZOOM: f64 = 9.0;

/// Construction options for a map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub container: String,
    pub style: String,
    pub center: Point,
    pub zoom: f64,
}

/// A rendered map that can host a drawing control.
pub trait MapSurface {
    /// Attach the drawing overlay's control.
    fn add_control(&mut self, options: &DrawOptions);
    /// Whether tiles have loaded and the surface is interactive.
    fn is_loaded(&self) -> bool;
    /// Release the surface and everything it holds.
    fn remove(&mut self);
}

/// Builds the two external pieces a map view needs.
pub trait MapBackend {
    type Surface: MapSurface;
    type Overlay: DrawOverlay;

    fn create_surface(&mut self, options: MapOptions) -> Self::Surface;
    fn create_overlay(&mut self, options: DrawOptions) -> Self::Overlay;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialized {
    Created,
    AlreadyInitialized,
}

/// Fixed parameters of a map view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub container: String,
    pub style: String,
    pub zoom: f64,
    pub fallback_center: Point,
    pub area_method: AreaMethod,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            container: "map".to_string(),
            style: SATELLITE_STYLE.to_string(),
            zoom: DEFAULT_ZOOM,
            fallback_center: FALLBACK_CENTER,
            area_method: AreaMethod::default(),
        }
    }
}

impl ViewSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            container: "map".to_string(),
            style: config.map.style.clone(),
            zoom: config.map.zoom,
            fallback_center: config.map.fallback_center(),
            area_method: config.area.method,
        }
    }
}

pub struct MapView<B: MapBackend> {
    settings: ViewSettings,
    surface: Option<B::Surface>,
    overlay: Option<B::Overlay>,
    ready: bool,
    on_ready: Option<Box<dyn FnOnce()>>,
    state: DisplayState,
}

impl<B: MapBackend> MapView<B> {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            settings,
            surface: None,
            overlay: None,
            ready: false,
            on_ready: None,
            state: DisplayState::empty(),
        }
    }

    /// Create the surface and the drawing overlay.
    ///
    /// `position` is the outcome of the one geolocation request; on error the
    /// configured fallback center is used. `on_ready` runs once, when the
    /// surface reports it has loaded. Does nothing if a surface already
    /// exists.
    pub fn initialize<F>(
        &mut self,
        backend: &mut B,
        position: Result<Point, GeolocationError>,
        on_ready: F,
    ) -> Initialized
    where
        F: FnOnce() + 'static,
    {
        if self.surface.is_some() {
            debug!("map already initialized; skipping");
            return Initialized::AlreadyInitialized;
        }

        let center = geolocation::resolve_center(position, self.settings.fallback_center);
        let options = MapOptions {
            container: self.settings.container.clone(),
            style: self.settings.style.clone(),
            center,
            zoom: self.settings.zoom,
        };
        info!(
            style = %options.style,
            lat = center.lat(),
            lng = center.lng(),
            zoom = options.zoom,
            "creating map surface"
        );

        let mut surface = backend.create_surface(options);
        let draw_options = DrawOptions::default();
        let overlay = backend.create_overlay(draw_options.clone());
        surface.add_control(&draw_options);

        self.surface = Some(surface);
        self.overlay = Some(overlay);
        self.ready = false;
        self.on_ready = Some(Box::new(on_ready));
        self.state = DisplayState::empty();
        Initialized::Created
    }

    /// The surface reported that it has loaded.
    ///
    /// Starts listening for draw events and runs the ready callback. Returns
    /// true only on the call that made the view ready.
    pub fn surface_loaded(&mut self) -> bool {
        if self.ready {
            return false;
        }
        let Some(surface) = self.surface.as_ref() else {
            return false;
        };
        if !surface.is_loaded() {
            debug!("load reported before the surface finished loading");
            return false;
        }

        info!("map has loaded");
        self.ready = true;
        if let Some(callback) = self.on_ready.take() {
            callback();
        }
        true
    }

    /// React to a create, update or delete on the drawing overlay.
    ///
    /// Returns the new display state, or `None` if the view is not listening
    /// yet (or any more).
    pub fn on_draw_changed(&mut self, event: DrawEvent) -> Option<&DisplayState> {
        if !self.ready {
            debug!(event = event.name(), "draw event before map load; ignored");
            return None;
        }
        let overlay = self.overlay.as_ref()?;

        let snapshot = overlay.get_all();
        debug!(event = event.name(), features = snapshot.len(), "draw changed");
        self.state = DisplayState::from_features(&snapshot, self.settings.area_method);
        Some(&self.state)
    }

    /// Release the surface. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            info!("removing map surface");
            surface.remove();
        }
        self.overlay = None;
        self.ready = false;
        self.on_ready = None;
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn surface(&self) -> Option<&B::Surface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut B::Surface> {
        self.surface.as_mut()
    }

    pub fn overlay(&self) -> Option<&B::Overlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut B::Overlay> {
        self.overlay.as_mut()
    }
}

impl<B: MapBackend> Drop for MapView<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
