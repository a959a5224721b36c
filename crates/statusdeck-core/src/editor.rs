// ── Editor model ──
//
// Row list for the status editor with optimistic edits. A row shows its
// requested state while the mutation is in flight, and incoming deliveries
// don't hide a pending edit. On failure the prior state comes back.

use chrono::Utc;

use crate::aggregate::overall_state;
use crate::model::{ServiceId, ServiceState, ServiceStatus};

/// An edit that has been applied optimistically and awaits confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub id: ServiceId,
    pub previous: ServiceStatus,
    pub requested: ServiceState,
}

#[derive(Debug, Default)]
pub struct EditorModel {
    rows: Vec<ServiceStatus>,
    pending: Vec<PendingEdit>,
    loaded: bool,
}

impl EditorModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the row list with a fresh delivery. Rows with an edit in
    /// flight keep showing the requested state; the delivered row becomes
    /// what a failed edit reverts to.
    pub fn load(&mut self, rows: Vec<ServiceStatus>) {
        self.rows = rows;
        self.loaded = true;
        for edit in &mut self.pending {
            if let Some(row) = self.rows.iter_mut().find(|r| r.id == edit.id) {
                edit.previous = row.clone();
                row.state = edit.requested;
            }
        }
    }

    pub fn rows(&self) -> &[ServiceStatus] {
        &self.rows
    }

    pub fn row(&self, id: &ServiceId) -> Option<&ServiceStatus> {
        self.rows.iter().find(|r| &r.id == id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_updating(&self, id: &ServiceId) -> bool {
        self.pending.iter().any(|p| &p.id == id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Start an edit. Returns `None` when the row is unknown, already
    /// updating, or already in the requested state.
    pub fn begin(&mut self, id: &ServiceId, requested: ServiceState) -> Option<PendingEdit> {
        if self.is_updating(id) {
            return None;
        }
        let row = self.rows.iter_mut().find(|r| &r.id == id)?;
        if row.state == requested {
            return None;
        }

        let edit = PendingEdit {
            id: id.clone(),
            previous: row.clone(),
            requested,
        };
        row.state = requested;
        self.pending.push(edit.clone());
        Some(edit)
    }

    /// Settle the edit for `id`. On success the row keeps the requested
    /// state with a fresh local timestamp; on failure it reverts unless a
    /// delivery has since replaced it with something else.
    pub fn finish(&mut self, id: &ServiceId, ok: bool) -> Option<PendingEdit> {
        let idx = self.pending.iter().position(|p| &p.id == id)?;
        let edit = self.pending.remove(idx);

        if let Some(row) = self.rows.iter_mut().find(|r| &r.id == id) {
            if ok {
                row.updated_at = Utc::now();
            } else if row.state == edit.requested {
                row.state = edit.previous.state;
                row.updated_at = edit.previous.updated_at;
            }
        }
        Some(edit)
    }

    /// Overall state of the rows as currently shown.
    pub fn overall(&self) -> ServiceState {
        overall_state(&self.rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn rows() -> Vec<ServiceStatus> {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        vec![
            ServiceStatus {
                id: "1".into(),
                name: "API".into(),
                state: ServiceState::Operational,
                updated_at: at,
            },
            ServiceStatus {
                id: "2".into(),
                name: "DB".into(),
                state: ServiceState::MajorOutage,
                updated_at: at,
            },
        ]
    }

    fn loaded() -> EditorModel {
        let mut model = EditorModel::new();
        model.load(rows());
        model
    }

    #[test]
    fn starts_unloaded() {
        let model = EditorModel::new();
        assert!(!model.is_loaded());
        assert!(model.rows().is_empty());
        assert_eq!(model.overall(), ServiceState::Operational);
    }

    #[test]
    fn begin_applies_optimistically() {
        let mut model = loaded();
        let id = ServiceId::from("2");
        let edit = model.begin(&id, ServiceState::Operational).unwrap();

        assert_eq!(edit.previous.state, ServiceState::MajorOutage);
        assert_eq!(model.row(&id).unwrap().state, ServiceState::Operational);
        assert!(model.is_updating(&id));
        assert_eq!(model.overall(), ServiceState::Operational);
    }

    #[test]
    fn no_second_edit_while_updating() {
        let mut model = loaded();
        let id = ServiceId::from("2");
        model.begin(&id, ServiceState::Operational).unwrap();
        assert!(model.begin(&id, ServiceState::Maintenance).is_none());

        // other rows stay editable
        assert!(model.begin(&ServiceId::from("1"), ServiceState::Maintenance).is_some());
    }

    #[test]
    fn no_op_edits_are_refused() {
        let mut model = loaded();
        assert!(model.begin(&ServiceId::from("1"), ServiceState::Operational).is_none());
        assert!(model.begin(&ServiceId::from("404"), ServiceState::Operational).is_none());
    }

    #[test]
    fn failure_rolls_back() {
        let mut model = loaded();
        let id = ServiceId::from("2");
        model.begin(&id, ServiceState::Operational).unwrap();
        model.finish(&id, false).unwrap();

        let row = model.row(&id).unwrap();
        assert_eq!(row.state, ServiceState::MajorOutage);
        assert_eq!(row.updated_at, rows()[1].updated_at);
        assert!(!model.is_updating(&id));
    }

    #[test]
    fn success_stamps_local_time() {
        let mut model = loaded();
        let id = ServiceId::from("2");
        model.begin(&id, ServiceState::Operational).unwrap();
        model.finish(&id, true).unwrap();

        let row = model.row(&id).unwrap();
        assert_eq!(row.state, ServiceState::Operational);
        assert!(row.updated_at > rows()[1].updated_at);
    }

    #[test]
    fn delivery_keeps_pending_edit_visible() {
        let mut model = loaded();
        let id = ServiceId::from("2");
        model.begin(&id, ServiceState::Maintenance).unwrap();

        model.load(rows());
        assert_eq!(model.row(&id).unwrap().state, ServiceState::Maintenance);
    }

    #[test]
    fn failure_after_newer_delivery_keeps_server_state() {
        let mut model = loaded();
        let id = ServiceId::from("2");
        model.begin(&id, ServiceState::Maintenance).unwrap();
        model.finish(&id, true).unwrap();

        model.begin(&id, ServiceState::Operational).unwrap();
        let mut fresh = rows();
        fresh[1].state = ServiceState::PartialOutage;
        model.load(fresh);
        // pending overlay wins while in flight
        assert_eq!(model.row(&id).unwrap().state, ServiceState::Operational);
        model.finish(&id, false).unwrap();
        assert_eq!(model.row(&id).unwrap().state, ServiceState::PartialOutage);
    }
}
