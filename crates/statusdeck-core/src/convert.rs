// ── Wire → domain conversion ──
//
// The only place raw strings from statusdeck-api become domain types.
// Status API documents are decoded leniently (unknown states become `None`);
// row-store rows are validated and rejected rows are dropped with a warning.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use statusdeck_api::models::{
    ComponentResponse, IncidentResponse, PlatformStatsResponse, StatusResponse, StatusRow,
};
use thiserror::Error;

use crate::model::{
    Component, Incident, IncidentState, PlatformStats, ServiceId, ServiceState, ServiceStatus,
    StatusSnapshot,
};

/// Parse an RFC 3339 timestamp, or a zone-less one taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_opt_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_timestamp)
}

fn state_or_unknown(raw: &str, context: &str) -> Option<ServiceState> {
    let state = ServiceState::from_wire(raw);
    if state.is_none() {
        tracing::debug!(raw, context, "unrecognised service state");
    }
    state
}

// ── Status API ───────────────────────────────────────────────────────

impl From<StatusResponse> for StatusSnapshot {
    fn from(r: StatusResponse) -> Self {
        Self {
            overall: state_or_unknown(&r.overall_status, "overall"),
            message: r.message.filter(|m| !m.trim().is_empty()),
            components: r.components.into_iter().map(Component::from).collect(),
            incidents: r.incidents.into_iter().map(Incident::from).collect(),
            maintenance: r.maintenance_events.into_iter().map(Incident::from).collect(),
            last_updated: parse_opt_timestamp(r.last_updated.as_deref()),
        }
    }
}

impl From<ComponentResponse> for Component {
    fn from(c: ComponentResponse) -> Self {
        Self {
            state: state_or_unknown(&c.status, &c.name),
            last_updated: parse_opt_timestamp(c.last_updated.as_deref()),
            name: c.name,
        }
    }
}

impl From<IncidentResponse> for Incident {
    fn from(i: IncidentResponse) -> Self {
        Self {
            state: IncidentState::from_wire(&i.status),
            created_at: parse_opt_timestamp(i.created_at.as_deref()),
            updated_at: parse_opt_timestamp(i.updated_at.as_deref()),
            id: i.id,
            title: i.title,
            description: i.description,
        }
    }
}

impl From<PlatformStatsResponse> for PlatformStats {
    fn from(s: PlatformStatsResponse) -> Self {
        Self {
            last_updated: parse_opt_timestamp(s.last_updated.as_deref()),
            total_users: s.total_users,
            active_users: s.active_users,
            total_posts: s.total_posts,
            total_tickets: s.total_tickets,
            total_partners: s.total_partners,
            total_events: s.total_events,
            total_marketplace_items: s.total_marketplace_items,
        }
    }
}

// ── Row store ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejected {
    #[error("row {id} has unknown status '{status}'")]
    UnknownState { id: String, status: String },
    #[error("row {id} has unparseable updated_at '{raw}'")]
    BadTimestamp { id: String, raw: String },
}

impl TryFrom<StatusRow> for ServiceStatus {
    type Error = RowRejected;

    fn try_from(row: StatusRow) -> Result<Self, Self::Error> {
        let Some(state) = ServiceState::from_wire(&row.status) else {
            return Err(RowRejected::UnknownState {
                id: row.id,
                status: row.status,
            });
        };
        let Some(updated_at) = parse_timestamp(&row.updated_at) else {
            return Err(RowRejected::BadTimestamp {
                id: row.id,
                raw: row.updated_at,
            });
        };
        Ok(Self {
            id: ServiceId::from(row.id),
            name: row.service,
            state,
            updated_at,
        })
    }
}

/// Validate rows, drop rejects and duplicate ids (first wins), and order by
/// service name.
pub fn services_from_rows(rows: Vec<StatusRow>) -> Vec<ServiceStatus> {
    let mut seen = HashSet::new();
    let mut services: Vec<ServiceStatus> = rows
        .into_iter()
        .filter_map(|row| match ServiceStatus::try_from(row) {
            Ok(service) => Some(service),
            Err(e) => {
                tracing::warn!(error = %e, "dropping invalid status row");
                None
            }
        })
        .filter(|service| {
            let fresh = seen.insert(service.id.clone());
            if !fresh {
                tracing::warn!(id = %service.id, "dropping duplicate status row");
            }
            fresh
        })
        .collect();
    services.sort_by(|a, b| a.name.cmp(&b.name));
    services
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn row(id: &str, service: &str, status: &str) -> StatusRow {
        StatusRow {
            id: id.into(),
            service: service.into(),
            status: status.into(),
            updated_at: "2026-01-01T12:00:00.123456+00:00".into(),
        }
    }

    #[test]
    fn timestamps_accept_rfc3339_and_naive() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2026-01-01T12:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-01T13:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-01T12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-01 12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn status_document_keeps_unknown_states() {
        let response: StatusResponse = serde_json::from_value(json!({
            "overall_status": "on-fire",
            "components": [
                { "name": "API", "status": "operational" },
                { "name": "Search", "status": "sluggish" }
            ],
            "incidents": [
                { "id": "i1", "title": "Slow search", "status": "postmortem" }
            ]
        }))
        .unwrap();

        let snapshot = StatusSnapshot::from(response);
        assert_eq!(snapshot.overall, None);
        assert_eq!(snapshot.components[0].state, Some(ServiceState::Operational));
        assert_eq!(snapshot.components[1].state, None);
        assert_eq!(snapshot.incidents[0].state, None);
    }

    #[test]
    fn blank_message_is_dropped() {
        let response: StatusResponse =
            serde_json::from_value(json!({ "overall_status": "operational", "message": "  " }))
                .unwrap();
        assert_eq!(StatusSnapshot::from(response).message, None);
    }

    #[test]
    fn rows_with_unknown_state_are_rejected() {
        let err = ServiceStatus::try_from(row("7", "API", "Exploded")).unwrap_err();
        assert_eq!(
            err,
            RowRejected::UnknownState {
                id: "7".into(),
                status: "Exploded".into()
            }
        );
    }

    #[test]
    fn rows_are_validated_deduplicated_and_sorted() {
        let services = services_from_rows(vec![
            row("2", "DB", "Major Outage"),
            row("1", "API", "Operational"),
            row("2", "DB-shadow", "Operational"),
            row("3", "Cache", "Melted"),
        ]);

        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["API", "DB"]);
        assert_eq!(services[1].state, ServiceState::MajorOutage);
    }
}
