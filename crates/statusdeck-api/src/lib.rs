// statusdeck-api: Async transport for status dashboards.
//
// Three surfaces: a polling status API (status + platform stats), a
// PostgREST-style row store, and a Phoenix-channel realtime websocket that
// announces row changes.

pub mod error;
pub mod models;
pub mod realtime;
pub mod rows;
pub mod status;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::Error;
pub use models::{
    ComponentResponse, IncidentResponse, PlatformStatsResponse, StatusResponse, StatusRow,
};
pub use realtime::{ChangeKind, ChangeNotice, ChannelConfig, RealtimeHandle, ReconnectConfig};
pub use rows::RowStoreClient;
pub use status::StatusApiClient;
pub use transport::{TlsMode, TransportConfig};
