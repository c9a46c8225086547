//! Runtime configuration read from the environment.
//!
//! | Variable                | Default               |
//! |-------------------------|-----------------------|
//! | `MAPTY_STORE_PATH`      | `mapty-workouts.json` |
//! | `MAPTY_HOME`            | unset (no position)   |
//! | `MAPTY_ZOOM`            | `14`                  |
//! | `MAPTY_FORM_RESTORE_MS` | `1000`                |
//! | `MAPTY_LOG`             | `warn`                |
//! | `MAPTY_LOG_FILE`        | `mapty.log`           |

use anyhow::{Context, Result, anyhow};
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::geo::Coords;
use crate::logging::parse_level;
use crate::session::SessionConfig;

pub const STORE_PATH_ENV: &str = "MAPTY_STORE_PATH";
pub const HOME_ENV: &str = "MAPTY_HOME";
pub const ZOOM_ENV: &str = "MAPTY_ZOOM";
pub const FORM_RESTORE_ENV: &str = "MAPTY_FORM_RESTORE_MS";
pub const LOG_ENV: &str = "MAPTY_LOG";
pub const LOG_FILE_ENV: &str = "MAPTY_LOG_FILE";

pub const DEFAULT_STORE_FILE: &str = "mapty-workouts.json";
pub const DEFAULT_LOG_FILE: &str = "mapty.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_path: PathBuf,
    /// Position the fixed geolocator reports.
    pub home: Option<Coords>,
    pub zoom_level: u8,
    pub form_restore_delay: Duration,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            home: None,
            zoom_level: session.zoom_level,
            form_restore_delay: session.form_restore_delay,
            log_level: LevelFilter::Warn,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset or blank values fall back
    /// to the defaults; values that do not parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(path) = get(STORE_PATH_ENV) {
            config.store_path = PathBuf::from(path.trim());
        }
        if let Some(home) = get(HOME_ENV) {
            config.home = Some(
                home.parse::<Coords>()
                    .with_context(|| format!("Invalid {HOME_ENV}"))?,
            );
        }
        if let Some(zoom) = get(ZOOM_ENV) {
            config.zoom_level = zoom
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ZOOM_ENV}: {zoom}"))?;
        }
        if let Some(ms) = get(FORM_RESTORE_ENV) {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("Invalid {FORM_RESTORE_ENV}: {ms}"))?;
            config.form_restore_delay = Duration::from_millis(ms);
        }
        if let Some(level) = get(LOG_ENV) {
            config.log_level =
                parse_level(&level).ok_or_else(|| anyhow!("Invalid {LOG_ENV}: {level}"))?;
        }
        if let Some(path) = get(LOG_FILE_ENV) {
            config.log_file = PathBuf::from(path.trim());
        }

        Ok(config)
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            zoom_level: self.zoom_level,
            form_restore_delay: self.form_restore_delay,
        }
    }
}
