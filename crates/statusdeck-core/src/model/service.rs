// ── Service status types ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, IntoEnumIterator};

/// Opaque row identifier from the row store. Never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ServiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Closed set of service states.
///
/// Variant order is the editor's cycling order, not severity; use
/// [`severity`](Self::severity) for precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ServiceState {
    Operational,
    PartialOutage,
    MajorOutage,
    Maintenance,
}

impl ServiceState {
    /// Decode either wire vocabulary: the row store's title-case labels or
    /// the status API's lowercase words. Case, `-` and `_` are ignored.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "operational" => Some(Self::Operational),
            "partial outage" | "degraded" => Some(Self::PartialOutage),
            "major outage" | "outage" => Some(Self::MajorOutage),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }

    /// Row-store spelling, also used when writing.
    pub fn row_label(self) -> &'static str {
        match self {
            Self::Operational => "Operational",
            Self::PartialOutage => "Partial Outage",
            Self::MajorOutage => "Major Outage",
            Self::Maintenance => "Maintenance",
        }
    }

    /// Status API spelling.
    pub fn api_label(self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::PartialOutage => "degraded",
            Self::MajorOutage => "outage",
            Self::Maintenance => "maintenance",
        }
    }

    /// Aggregation precedence: higher wins.
    pub fn severity(self) -> u8 {
        match self {
            Self::Operational => 0,
            Self::Maintenance => 1,
            Self::PartialOutage => 2,
            Self::MajorOutage => 3,
        }
    }

    pub fn next(self) -> Self {
        let all: Vec<Self> = Self::iter().collect();
        let idx = all.iter().position(|s| *s == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all: Vec<Self> = Self::iter().collect();
        let idx = all.iter().position(|s| *s == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.row_label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service state '{0}' (expected operational, partial-outage, major-outage or maintenance)")]
pub struct ParseStateError(pub String);

impl FromStr for ServiceState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| ParseStateError(s.to_owned()))
    }
}

impl Serialize for ServiceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.row_label())
    }
}

impl<'de> Deserialize<'de> for ServiceState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_wire(&raw).ok_or_else(|| serde::de::Error::custom(ParseStateError(raw)))
    }
}

/// One row of the live status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub id: ServiceId,
    #[serde(rename = "service")]
    pub name: String,
    #[serde(rename = "status")]
    pub state: ServiceState,
    pub updated_at: DateTime<Utc>,
}
