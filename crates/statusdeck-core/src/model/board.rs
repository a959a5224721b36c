// ── Board: the unified render view ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::service::{ServiceState, ServiceStatus};
use super::snapshot::{Component, Incident, PlatformStats, StatusSnapshot};
use crate::aggregate::overall_state;

/// Which spelling a board's states render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vocabulary {
    /// Status API words: "Degraded", "Outage".
    #[default]
    Api,
    /// Row-store labels: "Partial Outage", "Major Outage".
    Table,
}

/// Everything a status source delivers in one go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub overall: Option<ServiceState>,
    pub message: Option<String>,
    pub components: Vec<Component>,
    pub incidents: Vec<Incident>,
    pub maintenance: Vec<Incident>,
    /// Editable rows; empty for read-only sources.
    pub services: Vec<ServiceStatus>,
    pub stats: Option<PlatformStats>,
    pub last_updated: Option<DateTime<Utc>>,
    pub vocabulary: Vocabulary,
    /// Degraded-mode note, e.g. placeholder data.
    pub notice: Option<String>,
}

const PLACEHOLDER_SERVICES: [&str; 4] = ["API", "Authentication", "Database", "Storage"];

impl Board {
    /// Board for the polling source.
    pub fn from_snapshot(snapshot: &StatusSnapshot, stats: Option<&PlatformStats>) -> Self {
        Self {
            overall: snapshot.overall,
            message: snapshot.message.clone(),
            components: snapshot.components.clone(),
            incidents: snapshot.incidents.clone(),
            maintenance: snapshot.maintenance.clone(),
            services: Vec::new(),
            stats: stats.cloned(),
            last_updated: snapshot.last_updated,
            vocabulary: Vocabulary::Api,
            notice: None,
        }
    }

    /// Board for the live source; the overall state is aggregated from rows.
    pub fn from_services(services: Vec<ServiceStatus>) -> Self {
        let components = services
            .iter()
            .map(|s| Component {
                name: s.name.clone(),
                state: Some(s.state),
                last_updated: Some(s.updated_at),
            })
            .collect();
        Self {
            overall: Some(overall_state(&services)),
            message: None,
            components,
            incidents: Vec::new(),
            maintenance: Vec::new(),
            last_updated: services.iter().map(|s| s.updated_at).max(),
            services,
            stats: None,
            vocabulary: Vocabulary::Table,
            notice: None,
        }
    }

    /// Stand-in board when the live backend is unconfigured. Shows a fixed
    /// set of operational components and no editable rows.
    pub fn placeholder() -> Self {
        let components = PLACEHOLDER_SERVICES
            .iter()
            .map(|name| Component {
                name: (*name).to_owned(),
                state: Some(ServiceState::Operational),
                last_updated: None,
            })
            .collect();
        Self {
            overall: Some(ServiceState::Operational),
            message: None,
            components,
            incidents: Vec::new(),
            maintenance: Vec::new(),
            services: Vec::new(),
            stats: None,
            last_updated: None,
            vocabulary: Vocabulary::Table,
            notice: Some("Live backend not configured, showing placeholder data".into()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.notice.is_some() && self.services.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::ServiceId;

    fn row(id: &str, name: &str, state: ServiceState, hour: u32) -> ServiceStatus {
        ServiceStatus {
            id: ServiceId::from(id),
            name: name.into(),
            state,
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn live_board_aggregates_rows() {
        let board = Board::from_services(vec![
            row("1", "API", ServiceState::Operational, 9),
            row("2", "DB", ServiceState::MajorOutage, 11),
        ]);
        assert_eq!(board.overall, Some(ServiceState::MajorOutage));
        assert_eq!(board.vocabulary, Vocabulary::Table);
        assert_eq!(board.components.len(), 2);
        assert_eq!(board.services.len(), 2);
        assert_eq!(board.last_updated, Some(Utc.with_ymd_and_hms(2026, 1, 1, 11, 0, 0).unwrap()));
        assert!(!board.is_placeholder());
    }

    #[test]
    fn empty_live_board_is_operational() {
        let board = Board::from_services(Vec::new());
        assert_eq!(board.overall, Some(ServiceState::Operational));
        assert!(board.last_updated.is_none());
    }

    #[test]
    fn placeholder_board_has_no_editable_rows() {
        let board = Board::placeholder();
        assert!(board.is_placeholder());
        assert!(board.services.is_empty());
        assert_eq!(board.components.len(), PLACEHOLDER_SERVICES.len());
    }
}
