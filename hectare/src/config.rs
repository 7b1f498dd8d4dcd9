//! Application configuration.
//!
//! Config files are YAML. Every field has a default, so an empty file (or no
//! file at all) gives the stock behavior: satellite base layer, zoom 9,
//! fallback center at (-74.5, 40), spherical area.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::area::AreaMethod;
use crate::error::Error;
use crate::geolocation::FALLBACK_CENTER;
use crate::geometry::Point;
use crate::view::{DEFAULT_ZOOM, SATELLITE_STYLE};

/// File looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "hectare.yaml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub map: MapConfig,
    pub geolocation: GeolocationConfig,
    pub area: AreaConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Base layer id
    pub style: String,
    /// Starting zoom level
    pub zoom: f64,
    /// Center used when no position is available, as [lng, lat]
    pub fallback_center: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub enabled: bool,
    /// gpsd address (host:port)
    pub gpsd: String,
    pub timeout_ms: u64,
    /// Skip lookup and start here, as [lng, lat]
    pub fixed: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    pub method: AreaMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing-subscriber EnvFilter directive, overridden by RUST_LOG
    pub filter: String,
    /// Directory for the TUI's log files
    pub dir: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: SATELLITE_STYLE.to_string(),
            zoom: DEFAULT_ZOOM,
            fallback_center: [FALLBACK_CENTER.x, FALLBACK_CENTER.y],
        }
    }
}

impl MapConfig {
    pub fn fallback_center(&self) -> Point {
        Point::new(self.fallback_center[0], self.fallback_center[1])
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gpsd: "127.0.0.1:2947".to_string(),
            timeout_ms: 3000,
            fixed: None,
        }
    }
}

impl GeolocationConfig {
    pub fn fixed_point(&self) -> Option<Point> {
        self.fixed.map(|[lng, lat]| Point::new(lng, lat))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hectare=info".to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, Error> {
        // An empty document deserializes as unit, not as an empty map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Self::from_yaml_str(&text)
    }

    /// Load `explicit` if given, else `hectare.yaml` in the working
    /// directory if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, Error> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(AppConfig::from_yaml_str("").unwrap(), AppConfig::default());
        assert_eq!(AppConfig::from_yaml_str("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn defaults_match_stock_map() {
        let config = AppConfig::default();
        assert_eq!(config.map.style, "satellite-v9");
        assert_eq!(config.map.zoom, 9.0);
        assert_eq!(config.map.fallback_center(), Point::new(-74.5, 40.0));
        assert_eq!(config.area.method, AreaMethod::Spherical);
        assert!(config.geolocation.enabled);
    }

    #[test]
    fn partial_documents_keep_other_defaults() {
        let config = AppConfig::from_yaml_str(
            "area:\n  method: ellipsoidal\ngeolocation:\n  fixed: [2.35, 48.85]\n",
        )
        .unwrap();
        assert_eq!(config.area.method, AreaMethod::Ellipsoidal);
        assert_eq!(config.geolocation.fixed_point(), Some(Point::new(2.35, 48.85)));
        assert_eq!(config.geolocation.gpsd, "127.0.0.1:2947");
        assert_eq!(config.map, MapConfig::default());
    }

    #[test]
    fn unknown_method_is_an_error() {
        let result = AppConfig::from_yaml_str("area:\n  method: flat\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn yaml_round_trip() {
        let mut config = AppConfig::default();
        config.map.zoom = 12.0;
        let text = config.to_yaml().unwrap();
        assert_eq!(AppConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "map:\n  zoom: 14").unwrap();
        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.map.zoom, 14.0);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.yaml")));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
