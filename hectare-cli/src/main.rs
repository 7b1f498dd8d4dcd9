//! hectare - draw a polygon on a terminal map and read off its area
//!
//! Usage:
//!   hectare [--at lat,lng] [--no-gps]   Launch TUI
//!   hectare area <geojson|->             Measure the first polygon
//!   hectare config                       Print effective configuration

mod app;
mod cli;
mod gpsd;
mod logging;
mod preview;
mod surface;
mod ui;

use std::env;
use std::io::{self, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;

use hectare::AppConfig;

use app::{App, LaunchOptions};
use cli::{cmd_area, cmd_config};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Check for CLI subcommands
    let result = match args.get(1).map(String::as_str) {
        Some("area") => cmd_area(&args[2..]),
        Some("config") => cmd_config(&args[2..]),
        Some("help") | Some("--help") | Some("-h") => {
            print_usage(&args[0]);
            Ok(())
        }
        _ => LaunchOptions::parse(&args[1..]).and_then(|options| run_tui(&options)),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run_tui(options: &LaunchOptions) -> Result<()> {
    let config = AppConfig::load(options.config.as_deref())?;
    // Hold the guard until the terminal is restored so the last lines flush
    let guard = logging::init_file(&config.logging);
    let log_dir = guard.as_ref().map(|g| g.log_dir().to_path_buf());

    // Initialize terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(options, &config, log_dir);

    // Main loop
    let result = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    drop(guard);
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Geolocation result (non-blocking)
        app.check_position();
        app.update_preview();

        // Animate spinner while locating
        if app.is_locating() {
            app.spinner_frame = (app.spinner_frame + 1) % 8;
        }

        terminal.draw(|frame| ui::ui(frame, app))?;
        app.after_frame();

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("hectare - draw a polygon on a map and read off its area");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} [options]                        Launch TUI", prog);
    eprintln!("  {} area <geojson|-> [options]       Measure the first polygon", prog);
    eprintln!("  {} config [-c <file>]               Print effective configuration", prog);
    eprintln!("  {} help                             Show this message", prog);
    eprintln!();
    eprintln!("TUI options:");
    eprintln!("  -c, --config <file>   Config file (default: ./hectare.yaml if present)");
    eprintln!("  --at <lat,lng>        Start at this position instead of asking gpsd");
    eprintln!("  --no-gps              Skip geolocation and use the fallback center");
    eprintln!("  --gpsd <host:port>    gpsd address (default: 127.0.0.1:2947)");
    eprintln!();
    eprintln!("Area options:");
    eprintln!("  -f, --format <fmt>    text, json, html or svg (default: text)");
    eprintln!("  -o, --output <file>   Write to file instead of stdout");
    eprintln!("  -m, --method <name>   spherical or ellipsoidal (default from config)");
    eprintln!("  -c, --config <file>   Config file");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Arrows/WASD pan   +/- zoom   0 reset view");
    eprintln!("  Space/Enter add vertex   f finish   u undo   Esc cancel");
    eprintln!("  p polygon tool   Tab select next   H/J/K/L move selection");
    eprintln!("  x/Delete trash   e export GeoJSON   q quit");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --at 40.0,-74.5", prog);
    eprintln!("  {} area field.geojson -f json", prog);
    eprintln!("  cat field.geojson | {} area - -f svg > field.svg", prog);
}
