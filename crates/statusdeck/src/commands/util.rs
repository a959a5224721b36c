//! Shared helpers for command handlers.

use chrono::{DateTime, Utc};

use statusdeck_core::appearance::{self, Appearance};
use statusdeck_core::{BackendMode, DashboardConfig, ServiceState, Vocabulary};

use crate::error::CliError;
use crate::output;

/// `2026-01-01 12:00 UTC`, or `-` when absent.
pub fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string())
}

/// Glyph + label for a service state, colored when enabled.
pub fn state_cell(state: Option<ServiceState>, vocabulary: Vocabulary, color: bool) -> String {
    let Appearance { label, glyph, tone } = appearance::service(state, vocabulary);
    output::paint(&format!("{glyph} {label}"), tone, color)
}

/// Fail early when a live-only command has no usable backend.
pub fn require_backend(dash: &DashboardConfig) -> Result<(), CliError> {
    if dash.backend.mode() == BackendMode::Unconfigured {
        return Err(statusdeck_core::CoreError::BackendUnconfigured.into());
    }
    Ok(())
}
