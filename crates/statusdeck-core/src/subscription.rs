// ── Subscription handles ──
//
// Returned by every `start`/`subscribe` call. Unsubscribing cancels the
// background work exactly once; dropping the handle unsubscribes too.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

pub struct Subscription {
    label: &'static str,
    cancel: CancellationToken,
    active: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(label: &'static str, cancel: CancellationToken) -> Self {
        Self {
            label,
            cancel,
            active: AtomicBool::new(true),
        }
    }

    /// A handle with nothing behind it (degraded modes).
    pub fn inert(label: &'static str) -> Self {
        let cancel = CancellationToken::new();
        cancel.cancel();
        Self {
            label,
            cancel,
            active: AtomicBool::new(false),
        }
    }

    /// Stop deliveries. Idempotent.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            self.cancel.cancel();
            tracing::debug!(subscription = self.label, "unsubscribed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Resolves once the subscription has been cancelled.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsubscribe_is_idempotent() {
        let token = CancellationToken::new();
        let sub = Subscription::new("test", token.clone());
        assert!(sub.is_active());

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert!(token.is_cancelled());
    }

    #[test]
    fn drop_cancels() {
        let token = CancellationToken::new();
        drop(Subscription::new("test", token.clone()));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn inert_handle_is_already_closed() {
        let sub = Subscription::inert("test");
        assert!(!sub.is_active());
        sub.closed().await;
        sub.unsubscribe();
    }
}
