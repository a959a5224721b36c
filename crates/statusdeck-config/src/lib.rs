//! Shared configuration for the statusdeck CLI and TUI.
//!
//! TOML file + environment loading, access-key resolution (env var,
//! keyring, plaintext), and translation to `statusdeck_core::DashboardConfig`.
//! Both binaries depend on this crate; the CLI layers its flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use statusdeck_core::config::{
    DEFAULT_STATS_URL, DEFAULT_STATUS_URL, DEFAULT_TABLE, MIN_STATS_INTERVAL, MIN_STATUS_INTERVAL,
    PLACEHOLDER_BACKEND_URL,
};
use statusdeck_core::{BackendConfig, DashboardConfig, PollingConfig, SourceKind, TlsVerification};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "statusdeck";
/// Keyring entry holding the backend access key.
pub const KEYRING_ACCESS_KEY: &str = "backend/access-key";

const ENV_PREFIX: &str = "STATUSDECK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Which data source drives the dashboard.
    #[serde(default)]
    pub source: SourceKind,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub polling: PollingSection,

    #[serde(default)]
    pub backend: BackendSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            timeout: default_timeout(),
            ca_cert: None,
            polling: PollingSection::default(),
            backend: BackendSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingSection {
    #[serde(default = "default_status_url")]
    pub status_url: String,

    #[serde(default = "default_stats_url")]
    pub stats_url: String,

    /// Seconds between status fetches (floor 60).
    #[serde(default = "default_status_interval")]
    pub status_interval: u64,

    /// Seconds between stats fetches (floor 30).
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            status_url: default_status_url(),
            stats_url: default_stats_url(),
            status_interval: default_status_interval(),
            stats_interval: default_stats_interval(),
        }
    }
}

/// Row store + realtime backend for the live source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSection {
    /// Project base URL (e.g., "https://abc.supabase.co").
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Environment variable name containing the access key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_env: Option<String>,

    /// Access key (plaintext, prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// Explicit realtime websocket URL; derived from `url` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_url: Option<String>,

    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            access_key_env: None,
            access_key: None,
            realtime_url: None,
            table: default_table(),
        }
    }
}

fn default_timeout() -> u64 {
    15
}
fn default_status_url() -> String {
    DEFAULT_STATUS_URL.into()
}
fn default_stats_url() -> String {
    DEFAULT_STATS_URL.into()
}
fn default_status_interval() -> u64 {
    MIN_STATUS_INTERVAL.as_secs()
}
fn default_stats_interval() -> u64 {
    MIN_STATS_INTERVAL.as_secs()
}
fn default_backend_url() -> String {
    PLACEHOLDER_BACKEND_URL.into()
}
fn default_table() -> String {
    DEFAULT_TABLE.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("app", "gearshift", "statusdeck").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("statusdeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Access key resolution ───────────────────────────────────────────

/// Resolve the backend access key: named env var → keyring → plaintext.
/// `None` leaves the backend unconfigured.
pub fn resolve_access_key(backend: &BackendSection) -> Option<SecretString> {
    // 1. Named env var
    if let Some(ref env_name) = backend.access_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCESS_KEY) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    backend.access_key.clone().map(SecretString::from)
}

/// Store the access key in the system keyring.
pub fn store_access_key(secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCESS_KEY)?;
    entry.set_password(secret)?;
    Ok(())
}

/// Classify backend settings with an already-resolved key.
pub fn backend_config(backend: &BackendSection, access_key: Option<SecretString>) -> BackendConfig {
    BackendConfig::from_parts(
        &backend.url,
        access_key,
        backend.realtime_url.as_deref(),
        &backend.table,
    )
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `DashboardConfig`, resolving the access key from env/keyring.
pub fn to_dashboard_config(cfg: &Config) -> Result<DashboardConfig, ConfigError> {
    let access_key = match cfg.source {
        SourceKind::Live => resolve_access_key(&cfg.backend),
        SourceKind::Polling => None,
    };
    dashboard_config_with_key(cfg, access_key)
}

/// Build a `DashboardConfig` with an explicit access key (no lookups).
pub fn dashboard_config_with_key(
    cfg: &Config,
    access_key: Option<SecretString>,
) -> Result<DashboardConfig, ConfigError> {
    let polling = PollingConfig {
        status_url: parse_url("polling.status_url", &cfg.polling.status_url)?,
        stats_url: parse_url("polling.stats_url", &cfg.polling.stats_url)?,
        status_interval: Duration::from_secs(cfg.polling.status_interval),
        stats_interval: Duration::from_secs(cfg.polling.stats_interval),
    };

    if cfg.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let tls = cfg
        .ca_cert
        .clone()
        .map_or(TlsVerification::SystemDefaults, TlsVerification::CustomCa);

    Ok(DashboardConfig {
        source: cfg.source,
        polling,
        backend: backend_config(&cfg.backend, access_key),
        tls,
        timeout: Duration::from_secs(cfg.timeout),
    })
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|e: url::ParseError| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}
