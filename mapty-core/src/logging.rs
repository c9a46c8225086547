use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Where log lines go. A terminal UI owns stdout, so it logs to a file.
#[derive(Debug, Clone, PartialEq)]
pub enum LogTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

pub fn init_logger(level: LevelFilter, target: LogTarget) -> Result<()> {
    let target = match target {
        LogTarget::Stdout => env_logger::Target::Stdout,
        LogTarget::Stderr => env_logger::Target::Stderr,
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            env_logger::Target::Pipe(Box::new(file))
        }
    };

    let mut builder = env_logger::Builder::new();
    builder
        .format(move |buf, record| {
            writeln!(
                buf,
                "{}: {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(target)
        .filter_level(level);

    // The global logger can be installed once; later calls only move the level.
    if let Err(e) = builder.try_init() {
        log::debug!("logger already installed: {}", e);
    }

    log::set_max_level(level);
    Ok(())
}

pub fn parse_level(level: &str) -> Option<LevelFilter> {
    let lvl = match level.trim().to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => return None,
    };
    Some(lvl)
}

/// Initialises logging from a level name. Returns `false` for an unknown
/// name or an unusable target. Once a logger is installed, a later call only
/// changes the maximum level; the first target and format stay in place.
pub fn set_log_level(level: &str, target: LogTarget) -> bool {
    let Some(lvl) = parse_level(level) else {
        return false;
    };
    init_logger(lvl, target).is_ok()
}
