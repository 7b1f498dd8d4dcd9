//! TUI application state.
//!
//! The app owns a `MapView` over the terminal backend. Input arrives as key
//! presses; the ones that change the drawn shapes come back from the draw
//! layer as `DrawEvent`s and are handed to the view, which recomputes the
//! display state. The panel is re-rendered from that state every time.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui_image::picker::{Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;
use tracing::{info, warn};

use hectare::geolocation::parse_lat_lng;
use hectare::{
    AppConfig, DrawEvent, DrawLayer, DrawOverlay, FixedLocation, GeolocationError, Geolocator,
    InfoPanel, MapView, PanelContent, Point, Unavailable, ViewSettings,
};

use crate::gpsd::GpsdLocator;
use crate::preview;
use crate::surface::{TerminalBackend, TerminalMap};

type Position = Result<Point, GeolocationError>;

/// Command-line options for the TUI.
#[derive(Debug, Default, Clone)]
pub struct LaunchOptions {
    pub config: Option<PathBuf>,
    pub at: Option<Point>,
    pub no_gps: bool,
    pub gpsd: Option<String>,
}

impl LaunchOptions {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut options = LaunchOptions::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-c" | "--config" => {
                    i += 1;
                    let path = args.get(i).context("--config needs a file")?;
                    options.config = Some(PathBuf::from(path));
                }
                "--at" => {
                    i += 1;
                    let text = args.get(i).context("--at needs lat,lng")?;
                    options.at = Some(
                        parse_lat_lng(text)
                            .with_context(|| format!("invalid position '{}', expected lat,lng", text))?,
                    );
                }
                "--no-gps" => {
                    options.no_gps = true;
                }
                "--gpsd" => {
                    i += 1;
                    options.gpsd = Some(args.get(i).context("--gpsd needs host:port")?.clone());
                }
                other => bail!("unknown option: {}", other),
            }
            i += 1;
        }
        Ok(options)
    }
}

/// Pick the geolocation source: explicit position, config position, gpsd,
/// or nothing.
fn build_locator(options: &LaunchOptions, config: &AppConfig) -> Box<dyn Geolocator + Send> {
    if let Some(point) = options.at.or_else(|| config.geolocation.fixed_point()) {
        return Box::new(FixedLocation(point));
    }
    if options.no_gps || !config.geolocation.enabled {
        return Box::new(Unavailable);
    }
    let addr = options
        .gpsd
        .clone()
        .unwrap_or_else(|| config.geolocation.gpsd.clone());
    Box::new(GpsdLocator::new(
        addr,
        Duration::from_millis(config.geolocation.timeout_ms),
    ))
}

pub struct App {
    pub view: MapView<TerminalBackend>,
    backend: TerminalBackend,
    /// Pending geolocation result; `None` once it has arrived
    position_rx: Option<Receiver<Position>>,
    pub panel: PanelContent,
    picker: Picker,
    pub preview: Option<Box<dyn StatefulProtocol>>,
    needs_preview_update: bool,
    pub status: String,
    pub log_dir: Option<PathBuf>,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(options: &LaunchOptions, config: &AppConfig, log_dir: Option<PathBuf>) -> Self {
        let mut locator = build_locator(options, config);
        let (tx, rx) = mpsc::channel();

        // One lookup per session; the UI keeps running while it waits
        thread::spawn(move || {
            let _ = tx.send(locator.locate());
        });

        let mut picker = Picker::from_termios().unwrap_or_else(|_| Picker::new((8, 16)));
        picker.protocol_type = ProtocolType::Halfblocks;

        Self::with_source(config, rx, picker, log_dir)
    }

    /// Build the app around a pending position and an image picker.
    pub fn with_source(
        config: &AppConfig,
        position_rx: Receiver<Position>,
        picker: Picker,
        log_dir: Option<PathBuf>,
    ) -> Self {
        App {
            view: MapView::new(ViewSettings::from_config(config)),
            backend: TerminalBackend,
            position_rx: Some(position_rx),
            panel: PanelContent::Empty {
                message: hectare::panel::NOTHING_SELECTED.to_string(),
            },
            picker,
            preview: None,
            needs_preview_update: false,
            status: "Locating...".to_string(),
            log_dir,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn is_locating(&self) -> bool {
        self.position_rx.is_some()
    }

    /// Create the map once the position is known.
    pub fn check_position(&mut self) {
        let Some(rx) = &self.position_rx else {
            return;
        };
        let position = match rx.try_recv() {
            Ok(position) => position,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => Err(GeolocationError::Unavailable),
        };
        self.position_rx = None;

        if position.is_err() {
            self.status = "Location unavailable, using default center".to_string();
        }
        self.view.initialize(&mut self.backend, position, || {
            info!("map ready, listening for draw events");
        });
    }

    /// Called after each frame: the first frame with the map counts as load.
    pub fn after_frame(&mut self) {
        if let Some(surface) = self.view.surface_mut() {
            surface.mark_loaded();
        }
        if self.view.surface_loaded() {
            self.status = "Map has loaded - draw a polygon".to_string();
        }
    }

    pub fn map(&self) -> Option<&TerminalMap> {
        self.view.surface()
    }

    pub fn layer(&self) -> Option<&DrawLayer> {
        self.view.overlay()
    }

    fn apply(&mut self, event: Option<DrawEvent>) {
        let Some(event) = event else {
            return;
        };
        if self.view.on_draw_changed(event).is_none() {
            return;
        }

        let count = self.layer().map(|l| l.get_all().len()).unwrap_or(0);
        if count > 1 {
            self.status = format!("{} polygons drawn; only the first is measured", count);
        } else {
            self.status = event.name().to_string();
        }

        self.panel = match InfoPanel::render(self.view.state()) {
            Ok(panel) => panel,
            Err(e) => {
                warn!(error = %e, "panel render failed");
                self.status = format!("Panel error: {}", e);
                PanelContent::Empty {
                    message: hectare::panel::NOTHING_SELECTED.to_string(),
                }
            }
        };
        self.needs_preview_update = true;
    }

    pub fn update_preview(&mut self) {
        if !self.needs_preview_update {
            return;
        }
        self.needs_preview_update = false;

        self.preview = match &self.panel {
            PanelContent::Selected { svg, .. } => match preview::render_svg(svg) {
                Ok(img) => Some(self.picker.new_resize_protocol(img)),
                Err(e) => {
                    warn!(error = %e, "preview render failed");
                    None
                }
            },
            PanelContent::Empty { .. } => None,
        };
    }

    fn export(&mut self) {
        let Some(layer) = self.layer() else {
            return;
        };
        let text = layer.get_all().to_geojson_string();
        let name = format!("hectare-{}.geojson", chrono::Local::now().format("%Y%m%d-%H%M%S"));
        self.status = match fs::write(&name, text) {
            Ok(()) => {
                info!(file = %name, "exported drawn features");
                format!("Wrote {}", name)
            }
            Err(e) => format!("Export failed: {}", e),
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }
        if !self.view.is_ready() {
            return;
        }

        // Camera keys
        if let Some(map) = self.view.surface_mut() {
            match key.code {
                KeyCode::Up | KeyCode::Char('w') => return map.pan(0.0, 1.0),
                KeyCode::Down | KeyCode::Char('s') => return map.pan(0.0, -1.0),
                KeyCode::Left | KeyCode::Char('a') => return map.pan(-1.0, 0.0),
                KeyCode::Right | KeyCode::Char('d') => return map.pan(1.0, 0.0),
                KeyCode::Char('+') | KeyCode::Char('=') => return map.zoom_in(),
                KeyCode::Char('-') | KeyCode::Char('_') => return map.zoom_out(),
                KeyCode::Char('0') => return map.reset_view(),
                _ => {}
            }
        }

        if key.code == KeyCode::Char('e') {
            return self.export();
        }

        let Some(map) = self.view.surface() else {
            return;
        };
        let cursor = map.center();
        let (step_x, step_y) = map.step();

        let Some(layer) = self.view.overlay_mut() else {
            return;
        };
        let event = match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                layer.add_vertex(cursor);
                None
            }
            KeyCode::Char('u') | KeyCode::Backspace => {
                layer.undo_vertex();
                None
            }
            KeyCode::Char('f') => layer.finish(),
            KeyCode::Esc => {
                layer.cancel();
                None
            }
            KeyCode::Char('p') => {
                layer.start_polygon();
                None
            }
            KeyCode::Tab => {
                layer.select_next();
                None
            }
            KeyCode::Char('H') => layer.translate_selected(-step_x, 0.0),
            KeyCode::Char('L') => layer.translate_selected(step_x, 0.0),
            KeyCode::Char('K') => layer.translate_selected(0.0, step_y),
            KeyCode::Char('J') => layer.translate_selected(0.0, -step_y),
            KeyCode::Char('x') | KeyCode::Delete => layer.trash(),
            _ => None,
        };
        self.apply(event);
    }

    pub fn shutdown(&mut self) {
        self.view.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_launch_options() {
        let options =
            LaunchOptions::parse(&args(&["--at", "40.7,-74.0", "--gpsd", "gps:2947", "--no-gps"]))
                .unwrap();
        assert_eq!(options.at, Some(Point::new(-74.0, 40.7)));
        assert_eq!(options.gpsd.as_deref(), Some("gps:2947"));
        assert!(options.no_gps);
    }

    #[test]
    fn rejects_unknown_options() {
        assert!(LaunchOptions::parse(&args(&["--frobnicate"])).is_err());
        assert!(LaunchOptions::parse(&args(&["--at", "nowhere"])).is_err());
        assert!(LaunchOptions::parse(&args(&["--config"])).is_err());
    }

    #[test]
    fn explicit_position_wins() {
        let options = LaunchOptions {
            at: Some(Point::new(1.0, 2.0)),
            no_gps: true,
            ..Default::default()
        };
        let mut locator = build_locator(&options, &AppConfig::default());
        assert_eq!(locator.locate().unwrap(), Point::new(1.0, 2.0));
    }

    fn app_at(position: Position) -> App {
        let (tx, rx) = mpsc::channel();
        tx.send(position).unwrap();
        App::with_source(&AppConfig::default(), rx, Picker::new((8, 16)), None)
    }

    fn ready_app() -> App {
        let mut app = app_at(Ok(Point::new(10.0, 10.0)));
        app.check_position();
        app.after_frame();
        assert!(app.view.is_ready());
        app
    }

    fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn is_selected(app: &App) -> bool {
        matches!(app.panel, PanelContent::Selected { .. })
    }

    #[test]
    fn map_waits_for_the_position() {
        let (_tx, rx) = mpsc::channel();
        let mut app = App::with_source(&AppConfig::default(), rx, Picker::new((8, 16)), None);
        app.check_position();
        assert!(app.is_locating());
        assert!(app.map().is_none());
    }

    #[test]
    fn failed_lookup_uses_the_fallback_center() {
        let mut app = app_at(Err(GeolocationError::Unavailable));
        app.check_position();
        assert!(!app.is_locating());
        assert_eq!(app.map().unwrap().center(), Point::new(-74.5, 40.0));
        assert!(app.status.contains("Location unavailable"));
    }

    #[test]
    fn keys_before_load_are_ignored() {
        let mut app = app_at(Ok(Point::new(10.0, 10.0)));
        app.check_position();
        press(&mut app, " d w f");
        assert!(app.layer().unwrap().sketch().is_empty());
        assert!(!is_selected(&app));

        app.after_frame();
        assert_eq!(app.status, "Map has loaded - draw a polygon");
    }

    #[test]
    fn drawing_a_triangle_fills_the_panel() {
        let mut app = ready_app();
        press(&mut app, " d w ");
        assert_eq!(app.layer().unwrap().sketch().len(), 3);
        assert!(!is_selected(&app));

        press(&mut app, "f");
        assert_eq!(app.status, "draw.create");
        let PanelContent::Selected { area_hectares, polygons, .. } = &app.panel else {
            panic!("expected a selected panel");
        };
        assert!(*area_hectares > 0.0);
        assert_eq!(polygons[0].points.len(), 4);
    }

    #[test]
    fn moving_and_trashing_the_selection() {
        let mut app = ready_app();
        press(&mut app, " d w f");
        let before = app.layer().unwrap().features()[0].polygon.outer[0];

        press(&mut app, "K");
        assert_eq!(app.status, "draw.update");
        assert!(is_selected(&app));
        assert!(app.layer().unwrap().features()[0].polygon.outer[0].lat() > before.lat());

        press(&mut app, "x");
        assert_eq!(app.status, "draw.delete");
        assert!(app.layer().unwrap().features().is_empty());
        assert_eq!(
            app.panel,
            PanelContent::Empty {
                message: hectare::panel::NOTHING_SELECTED.to_string()
            }
        );
    }

    #[test]
    fn second_polygon_is_not_measured() {
        let mut app = ready_app();
        press(&mut app, " d w f");
        let PanelContent::Selected { area_hectares: first, .. } = app.panel.clone() else {
            panic!("expected a selected panel");
        };

        press(&mut app, "p dd ss f");
        assert_eq!(app.layer().unwrap().features().len(), 2);
        assert!(app.status.contains("only the first is measured"));
        let PanelContent::Selected { area_hectares, .. } = &app.panel else {
            panic!("expected a selected panel");
        };
        assert_eq!(*area_hectares, first);
    }

    #[test]
    fn quit_works_before_the_map_is_ready() {
        let mut app = app_at(Ok(Point::new(10.0, 10.0)));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn disabled_geolocation_is_unavailable() {
        let options = LaunchOptions {
            no_gps: true,
            ..Default::default()
        };
        let mut locator = build_locator(&options, &AppConfig::default());
        assert!(matches!(locator.locate(), Err(GeolocationError::Unavailable)));
    }
}
