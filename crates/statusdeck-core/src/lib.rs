// statusdeck-core: Status domain and data sources between statusdeck-api and consumers (CLI/TUI).

pub mod aggregate;
pub mod appearance;
pub mod config;
pub mod convert;
pub mod editor;
pub mod error;
pub mod live;
pub mod model;
pub mod polling;
pub mod source;
pub mod store;
pub mod subscription;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{overall_of_states, overall_state};
pub use appearance::{Appearance, Tone};
pub use config::{
    BackendConfig, BackendEndpoint, BackendMode, DashboardConfig, PollingConfig, SourceKind,
    TlsVerification,
};
pub use editor::{EditorModel, PendingEdit};
pub use error::CoreError;
pub use live::LiveClient;
pub use polling::PollingClient;
pub use source::{BoardCallback, LiveSource, PollingSource, StatusSource, build_source};
pub use store::FetchState;
pub use subscription::Subscription;

pub use model::{
    Board, Component, Incident, IncidentState, PlatformStats, ServiceId, ServiceState,
    ServiceStatus, StatusSnapshot, Vocabulary,
};
