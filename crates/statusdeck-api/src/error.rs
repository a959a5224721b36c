use thiserror::Error;

/// Top-level error type for the `statusdeck-api` crate.
///
/// Covers every failure mode across the three surfaces: status API,
/// row store, and realtime channel. `statusdeck-core` maps these into
/// user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The server answered with a non-success status code.
    #[error("Request to {url} failed with HTTP {status}")]
    HttpStatus { status: u16, url: String },

    // ── Row store ───────────────────────────────────────────────────
    /// The access key can't be sent as a header value.
    #[error("Invalid access key: {0}")]
    InvalidAccessKey(String),

    /// A filtered update matched no rows.
    #[error("No row matched id {id}")]
    NoRowsMatched { id: String },

    // ── Realtime ────────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed unexpectedly.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    /// The realtime server rejected a channel operation.
    #[error("Realtime channel error on {topic}: {message}")]
    Channel { topic: String, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the response arrived but had an unexpected shape.
    pub fn is_decode(&self) -> bool {
        match self {
            Self::Deserialization { .. } => true,
            Self::Transport(e) => e.is_decode(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_is_not_decode() {
        let err = Error::HttpStatus {
            status: 404,
            url: "https://status.example/api".into(),
        };
        assert!(!err.is_decode());
        assert_eq!(err.to_string(), "Request to https://status.example/api failed with HTTP 404");
    }

    #[test]
    fn deserialization_is_decode() {
        let err = Error::Deserialization {
            message: "missing field".into(),
            body: "{}".into(),
        };
        assert!(err.is_decode());
    }
}
