//! The drawing overlay: sketching, selecting, moving and deleting polygons.
//!
//! [`DrawLayer`] is a UI-agnostic model of a polygon drawing control. A host
//! feeds it gestures (add a vertex here, finish, delete the selection) and
//! gets back a [`DrawEvent`] whenever the set of finished features changed.
//! The events carry no payload: listeners re-query [`DrawOverlay::get_all`].
//!
//! ## Modes
//!
//! - **DrawPolygon**: gestures add vertices to an in-progress sketch.
//!   Finishing the sketch creates a feature and switches to SimpleSelect
//!   with the new feature selected.
//! - **SimpleSelect**: gestures select, move or delete finished features.

use tracing::debug;

use crate::features::{Feature, FeatureCollection};
use crate::geometry::{Point, Polygon};

/// Vertices closer than this (in degrees) count as the same click.
const DUPLICATE_VERTEX_EPSILON: f64 = 1e-9;

/// Minimum distinct vertices for a polygon.
const MIN_VERTICES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    DrawPolygon,
    SimpleSelect,
}

impl DrawMode {
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::DrawPolygon => "draw_polygon",
            DrawMode::SimpleSelect => "simple_select",
        }
    }
}

/// Which tools the overlay exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub polygon: bool,
    pub trash: bool,
}

/// Construction options for a draw overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOptions {
    pub default_mode: DrawMode,
    pub controls: Controls,
    /// Whether tools not named in `controls` are shown.
    pub display_controls_default: bool,
}

impl Default for DrawOptions {
    /// Polygon tool and trash only, starting in polygon drawing mode.
    fn default() -> Self {
        Self {
            default_mode: DrawMode::DrawPolygon,
            controls: Controls {
                polygon: true,
                trash: true,
            },
            display_controls_default: false,
        }
    }
}

/// What changed in the overlay's feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawEvent {
    Create,
    Update,
    Delete,
}

impl DrawEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DrawEvent::Create => "draw.create",
            DrawEvent::Update => "draw.update",
            DrawEvent::Delete => "draw.delete",
        }
    }
}

/// Anything that can report the shapes currently drawn.
///
/// ## Rust Lesson #24: Traits as seams
///
/// A trait describes behavior without fixing the type. `MapView` only needs
/// "give me all features", so it takes any `DrawOverlay` and never sees the
/// drawing modes behind it.
pub trait DrawOverlay {
    fn get_all(&self) -> FeatureCollection;
}

/// Interactive polygon drawing state.
#[derive(Debug, Clone)]
pub struct DrawLayer {
    options: DrawOptions,
    mode: DrawMode,
    features: Vec<Feature>,
    sketch: Vec<Point>,
    selected: Option<usize>,
    next_id: u64,
}

impl DrawLayer {
    pub fn new(options: DrawOptions) -> Self {
        Self {
            mode: options.default_mode,
            options,
            features: Vec::new(),
            sketch: Vec::new(),
            selected: None,
            next_id: 1,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Vertices of the polygon being drawn, not yet closed.
    pub fn sketch(&self) -> &[Point] {
        &self.sketch
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn selected(&self) -> Option<&Feature> {
        self.selected.and_then(|i| self.features.get(i))
    }

    /// Enter polygon drawing mode. Does nothing if the polygon tool is off.
    pub fn start_polygon(&mut self) -> bool {
        if !self.options.controls.polygon {
            return false;
        }
        self.mode = DrawMode::DrawPolygon;
        self.sketch.clear();
        self.selected = None;
        true
    }

    /// Add a vertex to the sketch. Repeated clicks on the same spot are
    /// ignored. Returns whether a vertex was added.
    pub fn add_vertex(&mut self, point: Point) -> bool {
        if self.mode != DrawMode::DrawPolygon {
            return false;
        }
        if let Some(last) = self.sketch.last() {
            if last.distance(point) < DUPLICATE_VERTEX_EPSILON {
                return false;
            }
        }
        self.sketch.push(point);
        true
    }

    pub fn undo_vertex(&mut self) -> Option<Point> {
        if self.mode != DrawMode::DrawPolygon {
            return None;
        }
        self.sketch.pop()
    }

    /// Close the sketch into a feature.
    ///
    /// Needs at least three vertices; otherwise the sketch is kept and
    /// nothing is emitted.
    pub fn finish(&mut self) -> Option<DrawEvent> {
        if self.mode != DrawMode::DrawPolygon || self.sketch.len() < MIN_VERTICES {
            return None;
        }

        let polygon = Polygon::new(std::mem::take(&mut self.sketch)).closed();
        let id = format!("feature-{}", self.next_id);
        self.next_id += 1;

        debug!(id = %id, vertices = polygon.vertex_count(), "polygon created");
        self.features.push(Feature::new(id, polygon));
        self.selected = Some(self.features.len() - 1);
        self.mode = DrawMode::SimpleSelect;
        Some(DrawEvent::Create)
    }

    /// Abandon the sketch, staying in the current mode.
    pub fn cancel(&mut self) {
        self.sketch.clear();
    }

    /// Cycle the selection through finished features.
    pub fn select_next(&mut self) -> Option<&Feature> {
        if self.features.is_empty() {
            self.selected = None;
            return None;
        }
        self.mode = DrawMode::SimpleSelect;
        self.sketch.clear();
        let next = match self.selected {
            Some(i) => (i + 1) % self.features.len(),
            None => 0,
        };
        self.selected = Some(next);
        self.features.get(next)
    }

    /// Move the selected feature by (dx, dy) degrees.
    ///
    /// A move that would push any vertex past a pole is refused.
    pub fn translate_selected(&mut self, dx: f64, dy: f64) -> Option<DrawEvent> {
        if self.mode != DrawMode::SimpleSelect {
            return None;
        }
        let feature = self.selected.and_then(|i| self.features.get_mut(i))?;

        let mut moved = feature.polygon.clone();
        moved.translate(dx, dy);
        let on_globe = moved
            .outer
            .iter()
            .chain(moved.holes.iter().flatten())
            .all(Point::has_valid_latitude);
        if !on_globe {
            debug!(id = %feature.id, dy, "move would cross a pole; ignored");
            return None;
        }

        feature.polygon = moved;
        Some(DrawEvent::Update)
    }

    /// The trash control.
    ///
    /// While drawing it discards the sketch; while selecting it deletes the
    /// selected feature. Only a deletion produces an event.
    pub fn trash(&mut self) -> Option<DrawEvent> {
        if !self.options.controls.trash {
            return None;
        }

        match self.mode {
            DrawMode::DrawPolygon => {
                self.sketch.clear();
                None
            }
            DrawMode::SimpleSelect => {
                let index = self.selected.take()?;
                if index >= self.features.len() {
                    return None;
                }
                let removed = self.features.remove(index);
                debug!(id = %removed.id, "polygon deleted");
                Some(DrawEvent::Delete)
            }
        }
    }
}

impl Default for DrawLayer {
    fn default() -> Self {
        Self::new(DrawOptions::default())
    }
}

impl DrawOverlay for DrawLayer {
    fn get_all(&self) -> FeatureCollection {
        FeatureCollection::new(self.features.clone())
    }
}
