// Wire types for the status API and the row store.
//
// These mirror the JSON shapes exactly. State fields stay as raw strings
// here; `statusdeck-core` owns the closed vocabularies and decides what an
// unrecognised spelling means.

use serde::{Deserialize, Deserializer, Serialize};

// ── Status API ──────────────────────────────────────────────────────

/// Body of `GET {status_url}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub overall_status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentResponse>,
    #[serde(default)]
    pub incidents: Vec<IncidentResponse>,
    #[serde(default)]
    pub maintenance_events: Vec<IncidentResponse>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentResponse {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Incidents and maintenance events share one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `GET {stats_url}`. Counters arrive pre-formatted, but some
/// deployments send bare numbers, so both are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatsResponse {
    #[serde(default, deserialize_with = "optional_counter")]
    pub total_users: Option<String>,
    #[serde(default, deserialize_with = "optional_counter")]
    pub active_users: Option<String>,
    #[serde(default, deserialize_with = "optional_counter")]
    pub total_posts: Option<String>,
    #[serde(default, deserialize_with = "optional_counter")]
    pub total_tickets: Option<String>,
    #[serde(default, deserialize_with = "optional_counter")]
    pub total_partners: Option<String>,
    #[serde(default, deserialize_with = "optional_counter")]
    pub total_events: Option<String>,
    #[serde(default, deserialize_with = "optional_counter")]
    pub total_marketplace_items: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

// ── Row store ───────────────────────────────────────────────────────

/// One row of the `statuses` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub service: String,
    pub status: String,
    pub updated_at: String,
}

// ── Lenient scalar helpers ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

fn optional_counter<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}
