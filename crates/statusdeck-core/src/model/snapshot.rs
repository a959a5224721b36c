// ── Polling snapshot types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::service::ServiceState;

/// Whole-system report from the status API.
///
/// States the API reports outside the known vocabulary are kept as `None`
/// and rendered neutral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub overall: Option<ServiceState>,
    pub message: Option<String>,
    pub components: Vec<Component>,
    pub incidents: Vec<Incident>,
    pub maintenance: Vec<Incident>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One named component row on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub state: Option<ServiceState>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentState {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
}

impl IncidentState {
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "investigating" => Some(Self::Investigating),
            "identified" => Some(Self::Identified),
            "monitoring" => Some(Self::Monitoring),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

/// An incident or a scheduled maintenance window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub state: Option<IncidentState>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Platform counters. Values arrive pre-formatted for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_users: Option<String>,
    pub active_users: Option<String>,
    pub total_posts: Option<String>,
    pub total_tickets: Option<String>,
    pub total_partners: Option<String>,
    pub total_events: Option<String>,
    pub total_marketplace_items: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PlatformStats {
    /// The four headline metrics in display order, missing values as `"0"`.
    pub fn headline(&self) -> [(&'static str, &str); 4] {
        [
            ("Total Users", counter(self.total_users.as_ref())),
            ("Builds Shared", counter(self.total_posts.as_ref())),
            ("Support Tickets", counter(self.total_tickets.as_ref())),
            ("Partners", counter(self.total_partners.as_ref())),
        ]
    }
}

fn counter(value: Option<&String>) -> &str {
    value.map_or("0", String::as_str)
}
