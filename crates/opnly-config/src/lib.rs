//! Configuration for opnly.
//!
//! A small TOML file with tuning knobs (timeouts, TLS, poll interval,
//! database location), merged with defaults and `OPNLY_*` environment
//! variables, and translated into [`opnly_core::ControllerSettings`].
//! Firewall credentials are not part of it; they live in the database.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use opnly_core::{ControllerSettings, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// SQLite database path. Defaults to `opnly.db` in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    #[serde(default = "default_get_timeout")]
    pub get_timeout_secs: u64,

    #[serde(default = "default_post_timeout")]
    pub post_timeout_secs: u64,

    /// Accept self-signed appliance certificates.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Custom CA certificate. Takes precedence over `insecure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            get_timeout_secs: default_get_timeout(),
            post_timeout_secs: default_post_timeout(),
            insecure: default_insecure(),
            ca_cert: None,
            poll_interval_ms: default_poll_interval(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

fn default_get_timeout() -> u64 {
    5
}
fn default_post_timeout() -> u64 {
    10
}
fn default_insecure() -> bool {
    true
}
fn default_poll_interval() -> u64 {
    2000
}
fn default_fetch_concurrency() -> usize {
    8
}

impl Settings {
    /// The database path, resolved against the platform data directory.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| data_dir().join("opnly.db"))
    }

    /// Translate into controller tuning, rejecting zero values.
    pub fn to_controller_settings(&self) -> Result<ControllerSettings, ConfigError> {
        let positive = |field: &str, value: u64| {
            if value == 0 {
                Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be greater than zero".into(),
                })
            } else {
                Ok(value)
            }
        };

        let get = positive("get_timeout_secs", self.get_timeout_secs)?;
        let post = positive("post_timeout_secs", self.post_timeout_secs)?;
        let poll = positive("poll_interval_ms", self.poll_interval_ms)?;
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Validation {
                field: "fetch_concurrency".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let tls = match (&self.ca_cert, self.insecure) {
            (Some(path), _) => TlsVerification::CustomCa(path.clone()),
            (None, true) => TlsVerification::DangerAcceptInvalid,
            (None, false) => TlsVerification::SystemDefaults,
        };

        Ok(ControllerSettings {
            tls,
            get_timeout: Duration::from_secs(get),
            post_timeout: Duration::from_secs(post),
            poll_interval: Duration::from_millis(poll),
            fetch_concurrency: self.fetch_concurrency,
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "opnly", "opnly")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding the default database.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".local/share"),
        |dirs| dirs.data_local_dir().to_path_buf(),
    )
}

fn fallback_dir(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("opnly");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load settings from the canonical config file and the environment.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&config_path())
}

/// Load settings from `path` (missing file is fine) and the environment.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let settings: Settings = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OPNLY_").only(&ENV_KEYS))
        .extract()?;
    Ok(settings)
}

/// Environment variables read as settings (`OPNLY_` + upper-case key).
const ENV_KEYS: [&str; 7] = [
    "database",
    "get_timeout_secs",
    "post_timeout_secs",
    "insecure",
    "ca_cert",
    "poll_interval_ms",
    "fetch_concurrency",
];

// ── Saving ──────────────────────────────────────────────────────────

/// Write settings to the canonical config path.
pub fn save_settings(settings: &Settings) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_settings_to(settings, &path)?;
    Ok(path)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(settings)?)?;
    Ok(())
}
