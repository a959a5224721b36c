//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text
//! and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use statusdeck_config::ConfigError;
use statusdeck_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const MUTATION_FAILED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const DECODE: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Status service ───────────────────────────────────────────────
    #[error("Unable to fetch status from {url}")]
    #[diagnostic(
        code(statusdeck::connection_failed),
        help(
            "Check your network connection and the configured URL.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Unable to fetch status: unexpected response")]
    #[diagnostic(
        code(statusdeck::decode),
        help("The service answered with something other than the expected JSON.\n{message}")
    )]
    Decode { message: String },

    // ── Live backend ─────────────────────────────────────────────────
    #[error("Live backend is not configured")]
    #[diagnostic(
        code(statusdeck::backend_unconfigured),
        help(
            "Set [backend] url and an access key with: statusdeck config init\n\
             Or pass --backend-url and --access-key.\n\
             Config file: {path}"
        )
    )]
    BackendUnconfigured { path: String },

    #[error("Failed to update service '{id}': {reason}")]
    #[diagnostic(
        code(statusdeck::mutation_failed),
        help("The row may not exist, or the access key may lack write permission. Run: statusdeck services")
    )]
    MutationFailed { id: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(statusdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(statusdeck::config))]
    Config(Box<ConfigError>),

    #[error("Internal error: {0}")]
    #[diagnostic(code(statusdeck::internal))]
    Internal(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Decode { .. } => exit_code::DECODE,
            Self::MutationFailed { .. } => exit_code::MUTATION_FAILED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::BackendUnconfigured { .. }
            | Self::Config(_)
            | Self::Internal(_)
            | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Fetch { url, reason } => Self::ConnectionFailed {
                url: url.unwrap_or_else(|| "(unknown)".into()),
                reason,
            },
            CoreError::Decode { message } => Self::Decode { message },
            CoreError::BackendUnconfigured => Self::BackendUnconfigured {
                path: statusdeck_config::config_path().display().to_string(),
            },
            CoreError::MutationFailed { id, reason } => Self::MutationFailed { id, reason },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_failure_kind() {
        let fetch: CliError = CoreError::Fetch {
            url: Some("https://example.test/api/status".into()),
            reason: "connection failed".into(),
        }
        .into();
        assert_eq!(fetch.exit_code(), exit_code::CONNECTION);

        let decode: CliError = CoreError::Decode {
            message: "expected value".into(),
        }
        .into();
        assert_eq!(decode.exit_code(), exit_code::DECODE);

        let mutation = CliError::MutationFailed {
            id: "2".into(),
            reason: "no row matched".into(),
        };
        assert_eq!(mutation.exit_code(), exit_code::MUTATION_FAILED);

        let unconfigured: CliError = CoreError::BackendUnconfigured.into();
        assert_eq!(unconfigured.exit_code(), exit_code::GENERAL);
    }
}
