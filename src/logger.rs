use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::domain::utils::statistics::ANALYTICS_TARGET;

const DEFAULT_LOG_DIR: &str = "logs";
const LOG_FILE: &str = "scheduler.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static INIT: Once = Once::new();

/// Initializes the global logger.
///
/// The level comes from `RUST_LOG` (`RUST_LOG=debug cargo run`) and defaults to `info`.
/// Records go to stderr (colored) and to `scheduler.log` inside `SCHEDULER_LOG_DIR`
/// (default `logs`). Structured analytics records only go to the file.
///
/// Only the first call installs the dispatcher.
pub fn init() {
    INIT.call_once(install);
}

fn level_from_env() -> LevelFilter {
    std::env::var("RUST_LOG").ok().and_then(|level| level.parse().ok()).unwrap_or(LevelFilter::Info)
}

fn log_dir_from_env() -> PathBuf {
    std::env::var_os("SCHEDULER_LOG_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}

fn console_dispatch() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    Dispatch::new()
        .filter(|metadata| metadata.target() != ANALYTICS_TARGET)
        .format(move |out, message, record| {
            out.finish(format_args!("[{} {} {}] {}", Local::now().format(TIMESTAMP_FORMAT), colors.color(record.level()), record.target(), message))
        })
        .chain(std::io::stderr())
}

fn file_dispatch(path: &Path) -> std::io::Result<Dispatch> {
    let file = fern::log_file(path)?;

    Ok(Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {} {}] {}", Local::now().format(TIMESTAMP_FORMAT), record.level(), record.target(), message))
        })
        .chain(file))
}

fn install() {
    let log_dir = log_dir_from_env();
    let log_file_path = log_dir.join(LOG_FILE);

    let mut dispatch = Dispatch::new().level(level_from_env()).level_for("tokio", LevelFilter::Warn).chain(console_dispatch());

    let file_logging = fs::create_dir_all(&log_dir).and_then(|_| file_dispatch(&log_file_path));
    match file_logging {
        Ok(file_config) => dispatch = dispatch.chain(file_config),
        Err(e) => eprintln!("Failed to open log file '{}': {}. Logging to console only.", log_file_path.display(), e),
    }

    if let Err(e) = dispatch.apply() {
        eprintln!("Failed to apply logger configuration: {}", e);
        return;
    }

    log::info!("Logger initialized. Writing to stderr and '{}'.", log_file_path.display());
}
