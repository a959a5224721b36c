//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use statusdeck_core::{Board, ServiceId, ServiceState};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Data events (from the status source) ──────────────────────
    BoardUpdated(Arc<Board>),
    /// A delivery failed; carries the banner text.
    FeedFailed(String),

    // ── Commands ──────────────────────────────────────────────────
    RequestRefresh,
    /// Already applied optimistically by the editor.
    RequestStatusChange {
        id: ServiceId,
        state: ServiceState,
    },
    StatusChangeFinished {
        id: ServiceId,
        state: ServiceState,
        ok: bool,
    },

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
