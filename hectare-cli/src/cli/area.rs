//! Area command implementation.
//!
//! Measures the first polygon of a GeoJSON document the same way the map
//! panel does and prints the panel in the requested format.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

use hectare::{AppConfig, AreaMethod, DisplayState, FeatureCollection, InfoPanel, PanelContent};

use super::common::{flag_value, read_input, write_output, OutputFormat};
use crate::logging;

/// JSON output: the panel plus how it was measured.
#[derive(Serialize)]
struct JsonReport<'a> {
    method: &'static str,
    features: usize,
    #[serde(flatten)]
    panel: &'a PanelContent,
}

struct AreaArgs {
    input: String,
    output: Option<PathBuf>,
    format: OutputFormat,
    method: Option<AreaMethod>,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<AreaArgs> {
    let mut input: Option<String> = None;
    let mut output = None;
    let mut format = OutputFormat::Text;
    let mut method = None;
    let mut config = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-f" | "--format" => {
                i += 1;
                let name = flag_value(args, i, "--format")?;
                format = OutputFormat::from_name(name)
                    .with_context(|| format!("unknown format '{}' (text, json, html, svg)", name))?;
            }
            "-o" | "--output" => {
                i += 1;
                output = Some(PathBuf::from(flag_value(args, i, "--output")?));
            }
            "-m" | "--method" => {
                i += 1;
                let name = flag_value(args, i, "--method")?;
                method = Some(
                    AreaMethod::from_name(name)
                        .with_context(|| format!("unknown method '{}' (spherical, ellipsoidal)", name))?,
                );
            }
            "-c" | "--config" => {
                i += 1;
                config = Some(PathBuf::from(flag_value(args, i, "--config")?));
            }
            arg if input.is_none() && (arg == "-" || !arg.starts_with('-')) => {
                input = Some(arg.to_string());
            }
            other => bail!("unexpected argument: {}", other),
        }
        i += 1;
    }

    let Some(input) = input else {
        bail!("usage: hectare area <geojson|-> [-f text|json|html|svg] [--method spherical|ellipsoidal]");
    };

    Ok(AreaArgs {
        input,
        output,
        format,
        method,
        config,
    })
}

/// Execute the area command.
pub fn cmd_area(args: &[String]) -> Result<()> {
    let args = parse_args(args)?;
    let config = AppConfig::load(args.config.as_deref())?;
    logging::init_stderr(&config.logging);

    let method = args.method.unwrap_or(config.area.method);
    let text = read_input(&args.input)?;
    let features = FeatureCollection::from_geojson_str(&text)
        .with_context(|| format!("failed to parse {}", args.input))?;

    let state = DisplayState::from_features(&features, method);
    info!(
        features = features.len(),
        hectares = state.area_hectares(),
        method = method.name(),
        "measured"
    );
    let panel = InfoPanel::render(&state)?;

    let rendered = match args.format {
        OutputFormat::Text => panel.lines().join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonReport {
            method: method.name(),
            features: features.len(),
            panel: &panel,
        })?,
        OutputFormat::Html => panel.to_html(),
        OutputFormat::Svg => {
            if state.is_empty() {
                bail!("no polygon with a positive area in {}", args.input);
            }
            state.svg_markup().to_string()
        }
    };

    write_output(&rendered, args.output.as_deref())
}

/// Print the effective configuration as YAML.
pub fn cmd_config(args: &[String]) -> Result<()> {
    let path = match args.first().map(String::as_str) {
        Some("-c") | Some("--config") => Some(PathBuf::from(flag_value(args, 1, "--config")?)),
        Some(other) => bail!("unexpected argument: {}", other),
        None => None,
    };
    let config = AppConfig::load(path.as_deref())?;
    write_output(&config.to_yaml()?, None)
}
