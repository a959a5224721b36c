//! State badges: glyph + label in the state's tone color.

use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use statusdeck_core::appearance::{self, Appearance};
use statusdeck_core::{IncidentState, ServiceState, Vocabulary};

use crate::theme;

fn badge(look: Appearance) -> Span<'static> {
    Span::styled(
        format!("{} {}", look.glyph, look.label),
        Style::default().fg(theme::tone_color(look.tone)),
    )
}

/// `● Operational`, `◐ Degraded`, ... colored by tone.
pub fn state_span(state: Option<ServiceState>, vocabulary: Vocabulary) -> Span<'static> {
    badge(appearance::service(state, vocabulary))
}

/// Bold variant for the overall badge.
pub fn overall_span(state: Option<ServiceState>, vocabulary: Vocabulary) -> Span<'static> {
    let span = state_span(state, vocabulary);
    let style = span.style.add_modifier(Modifier::BOLD);
    span.style(style)
}

pub fn incident_span(state: Option<IncidentState>) -> Span<'static> {
    badge(appearance::incident(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_carry_glyph_label_and_tone() {
        let span = state_span(Some(ServiceState::PartialOutage), Vocabulary::Table);
        assert_eq!(span.content, "◐ Partial Outage");
        assert_eq!(span.style.fg, Some(theme::CAUTION_ORANGE));

        let span = state_span(Some(ServiceState::PartialOutage), Vocabulary::Api);
        assert_eq!(span.content, "◐ Degraded");
        assert_eq!(span.style.fg, Some(theme::WARNING_YELLOW));

        let span = state_span(None, Vocabulary::Api);
        assert_eq!(span.content, "? Unknown");
        assert_eq!(span.style.fg, Some(theme::BORDER_GRAY));
    }

    #[test]
    fn overall_badge_is_bold() {
        let span = overall_span(Some(ServiceState::MajorOutage), Vocabulary::Api);
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(theme::ERROR_RED));
    }

    #[test]
    fn incident_badges() {
        assert_eq!(
            incident_span(Some(IncidentState::Monitoring)).content,
            "◎ Monitoring"
        );
    }
}
