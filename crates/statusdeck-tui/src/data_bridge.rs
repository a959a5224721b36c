//! Data bridge between a [`StatusSource`] and TUI actions.
//!
//! Runs as a background task: subscribes to the source and forwards every
//! delivery as an [`Action`] through the TUI's action channel. Commands
//! (refresh, status change) run as short-lived tasks that report back the
//! same way.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use statusdeck_core::{Board, CoreError, ServiceId, ServiceState, SourceKind, StatusSource};

use crate::action::Action;

fn delivery_action(delivery: Result<Board, CoreError>) -> Action {
    match delivery {
        Ok(board) => Action::BoardUpdated(Arc::new(board)),
        Err(e) => {
            warn!(error = %e, "status delivery failed");
            Action::FeedFailed(e.user_message())
        }
    }
}

/// Forward deliveries from `source` until cancelled.
///
/// Live subscriptions first deliver once the realtime channel is joined, so
/// the bridge seeds the screens with one read while the socket connects.
pub async fn spawn_data_bridge(
    source: Arc<dyn StatusSource>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    if source.kind() == SourceKind::Live {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            seed = source.fetch_board() => {
                let _ = action_tx.send(delivery_action(seed));
            }
        }
    }

    let tx = action_tx.clone();
    let subscription = source.subscribe(Arc::new(move |delivery| {
        let _ = tx.send(delivery_action(delivery));
    }));
    info!(source = %source.kind(), "data bridge subscribed");

    cancel.cancelled().await;
    subscription.unsubscribe();
    debug!("data bridge shut down");
}

/// Ask the source for an immediate re-read; results arrive via the bridge.
pub fn spawn_refresh(source: Arc<dyn StatusSource>) {
    tokio::spawn(async move {
        source.refresh_now().await;
    });
}

/// Run one mutation and report the outcome as [`Action::StatusChangeFinished`].
pub fn spawn_mutation(
    source: Arc<dyn StatusSource>,
    id: ServiceId,
    state: ServiceState,
    action_tx: mpsc::UnboundedSender<Action>,
) {
    tokio::spawn(async move {
        let ok = source.mutate(&id, state).await;
        debug!(%id, %state, ok, "status change finished");
        let _ = action_tx.send(Action::StatusChangeFinished { id, state, ok });
    });
}
