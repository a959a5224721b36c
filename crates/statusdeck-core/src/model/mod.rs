// ── Status domain model ──
//
// Canonical representation of everything the dashboard shows. Both data
// sources (polling API and live row store) normalize into these types, and
// both end up as a `Board` for rendering.

pub mod board;
pub mod service;
pub mod snapshot;

// ── Re-exports ──────────────────────────────────────────────────────

pub use board::{Board, Vocabulary};
pub use service::{ParseStateError, ServiceId, ServiceState, ServiceStatus};
pub use snapshot::{Component, Incident, IncidentState, PlatformStats, StatusSnapshot};
