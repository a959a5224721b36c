// ── State → appearance tables ──
//
// Label, glyph, and tone for every service and incident state, including
// the unknown case. Frontends map `Tone` onto their own palette.

use serde::Serialize;

use crate::model::{IncidentState, ServiceState, Vocabulary};

/// Semantic color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Green.
    Success,
    /// Yellow.
    Warning,
    /// Orange.
    Caution,
    /// Red.
    Danger,
    /// Blue.
    Info,
    /// Gray.
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Appearance {
    pub label: &'static str,
    pub glyph: &'static str,
    pub tone: Tone,
}

const UNKNOWN: Appearance = Appearance {
    label: "Unknown",
    glyph: "?",
    tone: Tone::Neutral,
};

/// How a service state looks in the given vocabulary.
///
/// The status API's "degraded" reads as a yellow warning; the row store's
/// "Partial Outage" is orange.
pub fn service(state: Option<ServiceState>, vocabulary: Vocabulary) -> Appearance {
    let Some(state) = state else {
        return UNKNOWN;
    };
    match (state, vocabulary) {
        (ServiceState::Operational, _) => Appearance {
            label: "Operational",
            glyph: "●",
            tone: Tone::Success,
        },
        (ServiceState::PartialOutage, Vocabulary::Api) => Appearance {
            label: "Degraded",
            glyph: "◐",
            tone: Tone::Warning,
        },
        (ServiceState::PartialOutage, Vocabulary::Table) => Appearance {
            label: "Partial Outage",
            glyph: "◐",
            tone: Tone::Caution,
        },
        (ServiceState::MajorOutage, Vocabulary::Api) => Appearance {
            label: "Outage",
            glyph: "✖",
            tone: Tone::Danger,
        },
        (ServiceState::MajorOutage, Vocabulary::Table) => Appearance {
            label: "Major Outage",
            glyph: "✖",
            tone: Tone::Danger,
        },
        (ServiceState::Maintenance, _) => Appearance {
            label: "Maintenance",
            glyph: "◆",
            tone: Tone::Info,
        },
    }
}

/// How an incident or maintenance state looks.
pub fn incident(state: Option<IncidentState>) -> Appearance {
    match state {
        Some(IncidentState::Investigating) => Appearance {
            label: "Investigating",
            glyph: "◌",
            tone: Tone::Warning,
        },
        Some(IncidentState::Identified) => Appearance {
            label: "Identified",
            glyph: "◉",
            tone: Tone::Caution,
        },
        Some(IncidentState::Monitoring) => Appearance {
            label: "Monitoring",
            glyph: "◎",
            tone: Tone::Info,
        },
        Some(IncidentState::Resolved) => Appearance {
            label: "Resolved",
            glyph: "●",
            tone: Tone::Success,
        },
        None => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn unknown_is_neutral() {
        assert_eq!(service(None, Vocabulary::Api).tone, Tone::Neutral);
        assert_eq!(service(None, Vocabulary::Table).glyph, "?");
        assert_eq!(incident(None).label, "Unknown");
    }

    #[test]
    fn vocabularies_differ_only_in_outage_labels() {
        assert_eq!(service(Some(ServiceState::PartialOutage), Vocabulary::Api).label, "Degraded");
        assert_eq!(
            service(Some(ServiceState::PartialOutage), Vocabulary::Table).label,
            "Partial Outage"
        );
        assert_eq!(service(Some(ServiceState::MajorOutage), Vocabulary::Api).label, "Outage");
        assert_eq!(
            service(Some(ServiceState::MajorOutage), Vocabulary::Table).label,
            "Major Outage"
        );
        assert_eq!(
            service(Some(ServiceState::Maintenance), Vocabulary::Api),
            service(Some(ServiceState::Maintenance), Vocabulary::Table)
        );
    }

    #[test]
    fn every_known_state_has_a_real_tone() {
        for state in ServiceState::iter() {
            for vocabulary in [Vocabulary::Api, Vocabulary::Table] {
                let look = service(Some(state), vocabulary);
                assert_ne!(look.tone, Tone::Neutral, "{state:?} in {vocabulary:?}");
                assert!(!look.label.is_empty());
            }
        }
    }

    #[test]
    fn incident_tones() {
        assert_eq!(incident(Some(IncidentState::Investigating)).tone, Tone::Warning);
        assert_eq!(incident(Some(IncidentState::Identified)).tone, Tone::Caution);
        assert_eq!(incident(Some(IncidentState::Monitoring)).tone, Tone::Info);
        assert_eq!(incident(Some(IncidentState::Resolved)).tone, Tone::Success);
    }
}
