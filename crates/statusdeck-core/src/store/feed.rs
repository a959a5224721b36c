use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::FetchState;
use crate::error::CoreError;

/// A watch-backed fetch state with last-dispatched-wins ordering.
///
/// Every request takes a sequence number from [`begin`](Self::begin). A
/// response is applied only if its number is newer than the last applied
/// one; the check and the write happen under the channel's lock.
pub struct Feed<T> {
    tx: watch::Sender<FetchState<T>>,
    dispatched: AtomicU64,
    applied: AtomicU64,
    name: &'static str,
}

impl<T: Send + Sync + 'static> Feed<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(FetchState::Loading);
        Self {
            tx,
            dispatched: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            name,
        }
    }

    /// Reserve the next sequence number for a request about to go out.
    pub fn begin(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply the outcome of request `seq`. Returns `false` if a newer
    /// response already landed and this one was discarded.
    pub fn complete(&self, seq: u64, result: Result<Arc<T>, CoreError>) -> bool {
        let applied = &self.applied;
        let name = self.name;
        self.tx.send_if_modified(move |state| {
            let latest = applied.load(Ordering::SeqCst);
            if seq <= latest {
                tracing::debug!(feed = name, seq, latest, "discarding out-of-order response");
                return false;
            }
            applied.store(seq, Ordering::SeqCst);
            state.apply(result);
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> FetchState<T> {
        self.tx.borrow().clone()
    }

    pub fn has_data(&self) -> bool {
        self.tx.borrow().data().is_some()
    }
}
