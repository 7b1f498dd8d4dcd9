use std::io;
use std::path::{Path, PathBuf};

use crossterm::terminal::{disable_raw_mode, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use hectare::config::LoggingConfig;

/// Keeps the background log writer alive; drop it last.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn default_log_dir() -> io::Result<PathBuf> {
    let dir = std::env::temp_dir().join("hectare").join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// File logging for the TUI, which owns stdout and stderr.
pub fn init_file(config: &LoggingConfig) -> Option<LoggingGuard> {
    let log_dir = match &config.dir {
        Some(dir) => std::fs::create_dir_all(dir).map(|_| dir.clone()),
        None => default_log_dir(),
    }
    .ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "hectare.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(&config.filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        );

    if subscriber.try_init().is_err() {
        return None;
    }

    install_panic_hook();

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}

/// Log panics, put the terminal back, then hand over to the previous hook.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        tracing::error!(panic = %panic_info, "panic");
        previous(panic_info);
    }));
}

/// Stderr logging for one-shot subcommands, leaving stdout for output.
pub fn init_stderr(config: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.filter))
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
