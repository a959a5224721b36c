// ── Status aggregation ──
//
// Pure severity precedence: MajorOutage > PartialOutage > Maintenance >
// Operational. An empty set is Operational.

use crate::model::{ServiceState, ServiceStatus};

/// Overall state for a set of services.
pub fn overall_state(services: &[ServiceStatus]) -> ServiceState {
    overall_of_states(services.iter().map(|s| s.state))
}

/// Overall state for any collection of states.
pub fn overall_of_states<I>(states: I) -> ServiceState
where
    I: IntoIterator<Item = ServiceState>,
{
    states
        .into_iter()
        .max_by_key(|s| s.severity())
        .unwrap_or(ServiceState::Operational)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::ServiceId;

    fn services(states: &[ServiceState]) -> Vec<ServiceStatus> {
        states
            .iter()
            .enumerate()
            .map(|(i, state)| ServiceStatus {
                id: ServiceId::new(i.to_string()),
                name: format!("svc-{i}"),
                state: *state,
                updated_at: Utc::now(),
            })
            .collect()
    }

    fn permutations(items: &[ServiceState]) -> Vec<Vec<ServiceState>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head);
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn empty_is_operational() {
        assert_eq!(overall_state(&[]), ServiceState::Operational);
    }

    #[test]
    fn major_outage_wins() {
        let set = services(&[
            ServiceState::Operational,
            ServiceState::Maintenance,
            ServiceState::MajorOutage,
            ServiceState::PartialOutage,
        ]);
        assert_eq!(overall_state(&set), ServiceState::MajorOutage);
    }

    #[test]
    fn partial_outage_beats_maintenance() {
        let set = services(&[
            ServiceState::Maintenance,
            ServiceState::PartialOutage,
            ServiceState::Operational,
        ]);
        assert_eq!(overall_state(&set), ServiceState::PartialOutage);
    }

    #[test]
    fn maintenance_beats_operational() {
        let set = services(&[ServiceState::Operational, ServiceState::Maintenance]);
        assert_eq!(overall_state(&set), ServiceState::Maintenance);
    }

    #[test]
    fn all_operational() {
        let set = services(&[ServiceState::Operational, ServiceState::Operational]);
        assert_eq!(overall_state(&set), ServiceState::Operational);
    }

    #[test]
    fn order_does_not_matter() {
        let states = [
            ServiceState::Operational,
            ServiceState::Maintenance,
            ServiceState::PartialOutage,
            ServiceState::Operational,
        ];
        for perm in permutations(&states) {
            assert_eq!(
                overall_of_states(perm.iter().copied()),
                ServiceState::PartialOutage,
                "permutation {perm:?}"
            );
        }
    }
}
