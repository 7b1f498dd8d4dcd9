//! Integration tests for hectare CLI commands.
//!
//! These tests run the actual binary and verify end-to-end behavior.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const DEGREE_SQUARE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "id": "field",
      "properties": {},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
      }
    }
  ]
}"#;

const TWO_FIELDS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[10.0, 10.0], [10.01, 10.0], [10.01, 10.01], [10.0, 10.01], [10.0, 10.0]]]
      }
    },
    {
      "type": "Feature",
      "properties": {},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[50.0, 50.0], [52.0, 50.0], [52.0, 52.0], [50.0, 52.0], [50.0, 50.0]]]
      }
    }
  ]
}"#;

fn hectare() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hectare"));
    // Keep a developer's hectare.yaml out of the picture
    cmd.current_dir(std::env::temp_dir());
    cmd
}

fn fixture(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("Failed to write fixture");
    path
}

fn run(args: &[&str]) -> Output {
    hectare().args(args).output().expect("Failed to execute command")
}

#[test]
fn area_command_prints_panel_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "square.geojson", DEGREE_SQUARE);

    let output = run(&["area", path.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Selected Area Information"));
    assert!(stdout.contains("Calculated area: "));
    assert!(stdout.contains(" hectare"));
    assert!(stdout.contains("Polygon 1:"));
    assert!(stdout.contains("Lat: 0, Lng: 0"));
    assert!(stdout.contains("Lat: 1, Lng: 1"));
}

#[test]
fn area_command_produces_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "square.geojson", DEGREE_SQUARE);

    let output = run(&["area", path.to_str().unwrap(), "-f", "json"]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["kind"], "selected");
    assert_eq!(json["method"], "spherical");
    assert_eq!(json["features"], 1);

    let hectares = json["area_hectares"].as_f64().expect("area should be a number");
    assert!(hectares > 1.2e6 && hectares < 1.25e6, "got {}", hectares);

    let svg = json["svg"].as_str().unwrap();
    assert!(svg.contains("fill:black"), "preview fill should be forced: {}", svg);
    assert_eq!(json["polygons"][0]["label"], "Polygon 1");
}

#[test]
fn ellipsoidal_method_is_close_to_spherical() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "square.geojson", DEGREE_SQUARE);

    let area = |method: &str| {
        let output = run(&["area", path.to_str().unwrap(), "-f", "json", "--method", method]);
        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["method"], method);
        json["area_hectares"].as_f64().unwrap()
    };

    let sphere = area("spherical");
    let ellipsoid = area("ellipsoidal");
    assert!(((sphere - ellipsoid) / sphere).abs() < 0.01);
}

#[test]
fn svg_output_is_the_raw_sketch() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "square.geojson", DEGREE_SQUARE);

    let output = run(&["area", path.to_str().unwrap(), "-f", "svg"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<svg"), "Should have SVG element");
    assert!(stdout.contains("<polygon points=\"0,0 1,0 1,1 0,1 0,0\""));
    assert!(stdout.contains("fill:lime"), "raw markup keeps its own fill");
}

#[test]
fn html_output_wraps_the_panel() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "square.geojson", DEGREE_SQUARE);
    let out_path = dir.path().join("panel.html");

    let output = run(&["area", path.to_str().unwrap(), "-f", "html", "-o", out_path.to_str().unwrap()]);
    assert!(output.status.success());

    let html = fs::read_to_string(&out_path).expect("Output file should exist");
    assert!(html.contains("<h2>Selected Area Information</h2>"));
    assert!(html.contains("<li>Lat: 0, Lng: 0</li>"));
    assert!(html.contains("<svg"));
}

#[test]
fn only_the_first_polygon_is_measured() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "two.geojson", TWO_FIELDS);

    let output = run(&["area", path.to_str().unwrap(), "-f", "json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["features"], 2);
    assert_eq!(json["polygons"].as_array().unwrap().len(), 1);

    // A 0.01 degree square near the equator is on the order of 100 ha
    let hectares = json["area_hectares"].as_f64().unwrap();
    assert!(hectares > 50.0 && hectares < 200.0, "got {}", hectares);
}

#[test]
fn empty_collection_shows_placeholder() {
    let mut child = hectare()
        .args(["area", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{"type":"FeatureCollection","features":[]}"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No area has been selected"));
    assert!(!stdout.contains("Calculated area"));
}

#[test]
fn svg_of_nothing_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "empty.geojson", r#"{"type":"FeatureCollection","features":[]}"#);

    let output = run(&["area", path.to_str().unwrap(), "-f", "svg"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn missing_file_is_an_error() {
    let output = run(&["area", "/nonexistent/field.geojson"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

#[test]
fn config_command_prints_yaml() {
    let output = run(&["config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("satellite-v9"));
    assert!(stdout.contains("method: spherical"));
    assert!(stdout.contains("127.0.0.1:2947"));
}

#[test]
fn config_file_sets_the_area_method() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "hectare.yaml", "area:\n  method: ellipsoidal\n");
    let path = fixture(dir.path(), "square.geojson", DEGREE_SQUARE);

    let output = run(&["area", path.to_str().unwrap(), "-f", "json", "-c", config.to_str().unwrap()]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["method"], "ellipsoidal");
}

#[test]
fn help_lists_commands() {
    let output = run(&["help"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("area <geojson|->"));
    assert!(stderr.contains("config"));
}

#[test]
fn unknown_option_fails_before_the_terminal_starts() {
    let output = run(&["--frobnicate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown option"));
}
