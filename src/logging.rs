use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_DIRECTIVE: &str = "matchpick_terminal=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Log to a file; the terminal belongs to the dashboard. Keep the guard alive until exit.
pub fn init_file_logging(path: &Path) -> Result<WorkerGuard> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    let file_name = path
        .file_name()
        .context("log path has no file name")?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(env_filter()),
        )
        .try_init()
        .context("logging already initialised")?;
    Ok(guard)
}

pub fn init_stderr_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_filter(env_filter()),
        )
        .try_init();
}
