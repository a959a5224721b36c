// ── Core error types ──
//
// User-facing errors from statusdeck-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<statusdeck_api::Error>`
// impl folds transport-layer errors into these variants. Every variant is
// cheap to clone so fetch states can carry the last failure.

use thiserror::Error;

/// Banner shown for any failed fetch, whatever the underlying cause.
pub const FETCH_FAILED_BANNER: &str = "Unable to fetch status";

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("Can't reach status service: {reason}")]
    Fetch { url: Option<String>, reason: String },

    #[error("Unexpected response from status service: {message}")]
    Decode { message: String },

    // ── Backend errors ───────────────────────────────────────────────
    #[error("Live backend is not configured")]
    BackendUnconfigured,

    #[error("Failed to update service {id}: {reason}")]
    MutationFailed { id: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// One-line text for a banner or toast.
    ///
    /// Fetch and decode failures deliberately read the same.
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch { .. } | Self::Decode { .. } => FETCH_FAILED_BANNER.to_owned(),
            other => other.to_string(),
        }
    }

    /// `true` for failures of the read path (fetch or decode).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Decode { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<statusdeck_api::Error> for CoreError {
    fn from(err: statusdeck_api::Error) -> Self {
        use statusdeck_api::Error as Api;

        if err.is_decode() {
            return Self::Decode {
                message: err.to_string(),
            };
        }

        match err {
            Api::HttpStatus { status, url } => Self::Fetch {
                url: Some(url),
                reason: format!("request failed (HTTP {status})"),
            },
            Api::Transport(ref e) => Self::Fetch {
                url: e.url().map(ToString::to_string),
                reason: if e.is_timeout() {
                    "request timed out".into()
                } else if e.is_connect() {
                    "connection failed".into()
                } else {
                    e.to_string()
                },
            },
            Api::NoRowsMatched { id } => Self::MutationFailed {
                id,
                reason: "no row matched".into(),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("invalid URL: {e}"),
            },
            Api::Tls(message) | Api::InvalidAccessKey(message) => Self::Config { message },
            other @ (Api::WebSocketConnect(_)
            | Api::WebSocketClosed { .. }
            | Api::Channel { .. }
            | Api::Deserialization { .. }) => Self::Fetch {
                url: None,
                reason: other.to_string(),
            },
        }
    }
}
