// ── Runtime configuration ──
//
// Built by the config crate (or tests) and handed to the clients. Nothing
// here reads files or the environment.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use statusdeck_api::{TlsMode, TransportConfig};
use url::Url;

// ── Defaults ─────────────────────────────────────────────────────────

pub const DEFAULT_STATUS_URL: &str = "https://getgearshift.app/api/status";
pub const DEFAULT_STATS_URL: &str = "https://getgearshift.app/api/stats/platform";

/// Sentinel values that mean "live backend not set up".
pub const PLACEHOLDER_BACKEND_URL: &str = "https://placeholder.supabase.co";
pub const PLACEHOLDER_ACCESS_KEY: &str = "placeholder-key";

pub const DEFAULT_TABLE: &str = "statuses";
pub const DEFAULT_CHANNEL: &str = "realtime-status";

/// Floors for the polling cadence.
pub const MIN_STATUS_INTERVAL: Duration = Duration::from_secs(60);
pub const MIN_STATS_INTERVAL: Duration = Duration::from_secs(30);

// ── Source selection ─────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceKind {
    /// Periodic HTTP polling of the status API.
    #[default]
    Polling,
    /// Row store + realtime change notifications.
    Live,
}

#[derive(Debug, Clone, Default)]
pub enum TlsVerification {
    #[default]
    SystemDefaults,
    CustomCa(PathBuf),
}

// ── Polling ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub status_url: Url,
    pub stats_url: Url,
    pub status_interval: Duration,
    pub stats_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_url: default_url(DEFAULT_STATUS_URL),
            stats_url: default_url(DEFAULT_STATS_URL),
            status_interval: MIN_STATUS_INTERVAL,
            stats_interval: MIN_STATS_INTERVAL,
        }
    }
}

impl PollingConfig {
    /// Status cadence, clamped up to the 60 s floor.
    pub fn effective_status_interval(&self) -> Duration {
        clamp_interval("status", self.status_interval, MIN_STATUS_INTERVAL)
    }

    /// Stats cadence, clamped up to the 30 s floor.
    pub fn effective_stats_interval(&self) -> Duration {
        clamp_interval("stats", self.stats_interval, MIN_STATS_INTERVAL)
    }
}

fn clamp_interval(feed: &str, configured: Duration, floor: Duration) -> Duration {
    if configured < floor {
        tracing::warn!(
            feed,
            configured_secs = configured.as_secs(),
            floor_secs = floor.as_secs(),
            "refresh interval below floor, clamping"
        );
        floor
    } else {
        configured
    }
}

fn default_url(raw: &'static str) -> Url {
    Url::parse(raw).expect("built-in URL constants are valid")
}

// ── Live backend ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Unconfigured,
    Configured,
}

/// A usable row-store + realtime endpoint.
#[derive(Debug, Clone)]
pub struct BackendEndpoint {
    pub url: Url,
    pub access_key: SecretString,
    /// Explicit realtime URL; derived from `url` when absent.
    pub realtime_url: Option<Url>,
    pub table: String,
    pub channel: String,
}

#[derive(Debug, Clone, Default)]
pub enum BackendConfig {
    #[default]
    Unconfigured,
    Configured(BackendEndpoint),
}

impl BackendConfig {
    /// Classify raw settings. Empty or placeholder URL, missing or
    /// placeholder key, and unparseable URLs all mean unconfigured.
    pub fn from_parts(
        url: &str,
        access_key: Option<SecretString>,
        realtime_url: Option<&str>,
        table: &str,
    ) -> Self {
        let url = url.trim();
        if url.is_empty() || url.trim_end_matches('/') == PLACEHOLDER_BACKEND_URL {
            return Self::Unconfigured;
        }

        let Some(access_key) = access_key.filter(|k| {
            let k = k.expose_secret().trim();
            !k.is_empty() && k != PLACEHOLDER_ACCESS_KEY
        }) else {
            return Self::Unconfigured;
        };

        let url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(error = %e, "backend URL is invalid, treating backend as unconfigured");
                return Self::Unconfigured;
            }
        };

        let realtime_url = realtime_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|raw| match Url::parse(raw) {
                Ok(u) => Some(u),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring invalid realtime URL override");
                    None
                }
            });

        let table = if table.trim().is_empty() {
            DEFAULT_TABLE
        } else {
            table.trim()
        };

        Self::Configured(BackendEndpoint {
            url,
            access_key,
            realtime_url,
            table: table.to_owned(),
            channel: DEFAULT_CHANNEL.to_owned(),
        })
    }

    pub fn mode(&self) -> BackendMode {
        match self {
            Self::Unconfigured => BackendMode::Unconfigured,
            Self::Configured(_) => BackendMode::Configured,
        }
    }
}

// ── DashboardConfig ──────────────────────────────────────────────────

/// Everything needed to build a status source.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source: SourceKind,
    pub polling: PollingConfig,
    pub backend: BackendConfig,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            polling: PollingConfig::default(),
            backend: BackendConfig::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl DashboardConfig {
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> Option<SecretString> {
        Some(raw.to_string().into())
    }

    #[test]
    fn placeholder_url_is_unconfigured() {
        let backend = BackendConfig::from_parts(PLACEHOLDER_BACKEND_URL, key("real-key"), None, "statuses");
        assert_eq!(backend.mode(), BackendMode::Unconfigured);

        let backend = BackendConfig::from_parts("https://placeholder.supabase.co/", key("real-key"), None, "statuses");
        assert_eq!(backend.mode(), BackendMode::Unconfigured);
    }

    #[test]
    fn empty_url_is_unconfigured() {
        let backend = BackendConfig::from_parts("  ", key("real-key"), None, "statuses");
        assert_eq!(backend.mode(), BackendMode::Unconfigured);
    }

    #[test]
    fn placeholder_or_missing_key_is_unconfigured() {
        let url = "https://abc.backend.example";
        assert_eq!(
            BackendConfig::from_parts(url, key(PLACEHOLDER_ACCESS_KEY), None, "statuses").mode(),
            BackendMode::Unconfigured
        );
        assert_eq!(
            BackendConfig::from_parts(url, None, None, "statuses").mode(),
            BackendMode::Unconfigured
        );
    }

    #[test]
    fn garbage_url_is_unconfigured() {
        let backend = BackendConfig::from_parts("not a url", key("real-key"), None, "statuses");
        assert_eq!(backend.mode(), BackendMode::Unconfigured);
    }

    #[test]
    fn real_settings_are_configured() {
        let backend = BackendConfig::from_parts(
            "https://abc.backend.example",
            key("real-key"),
            Some("wss://rt.backend.example/socket"),
            "",
        );
        let BackendConfig::Configured(endpoint) = backend else {
            panic!("expected configured backend");
        };
        assert_eq!(endpoint.table, DEFAULT_TABLE);
        assert_eq!(endpoint.channel, DEFAULT_CHANNEL);
        assert_eq!(
            endpoint.realtime_url.map(|u| u.to_string()).as_deref(),
            Some("wss://rt.backend.example/socket")
        );
    }

    #[test]
    fn intervals_clamp_to_floor() {
        let config = PollingConfig {
            status_interval: Duration::from_secs(5),
            stats_interval: Duration::from_secs(45),
            ..PollingConfig::default()
        };
        assert_eq!(config.effective_status_interval(), MIN_STATUS_INTERVAL);
        assert_eq!(config.effective_stats_interval(), Duration::from_secs(45));
    }

    #[test]
    fn source_kind_parses_case_insensitively() {
        assert_eq!("LIVE".parse::<SourceKind>().ok(), Some(SourceKind::Live));
        assert_eq!(SourceKind::Polling.to_string(), "polling");
    }
}
