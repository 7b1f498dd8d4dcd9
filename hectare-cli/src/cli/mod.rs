//! CLI command implementations.
//!
//! - `area` - Measure the first polygon of a GeoJSON file
//! - `config` - Print the effective configuration

pub mod area;
pub mod common;

pub use area::{cmd_area, cmd_config};
