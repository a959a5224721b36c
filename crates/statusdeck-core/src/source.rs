// ── Unified status source ──
//
// One capability interface over both clients so the TUI and CLI never care
// which backend is configured. Sources are built explicitly from config.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::{BackendMode, DashboardConfig, SourceKind};
use crate::error::CoreError;
use crate::live::LiveClient;
use crate::model::{Board, PlatformStats, ServiceId, ServiceState, ServiceStatus, StatusSnapshot};
use crate::polling::PollingClient;
use crate::store::FetchState;
use crate::subscription::Subscription;

/// Receives every delivery from a subscription.
pub type BoardCallback = Arc<dyn Fn(Result<Board, CoreError>) + Send + Sync>;

#[async_trait]
pub trait StatusSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Whether [`mutate`](Self::mutate) can ever succeed.
    fn can_mutate(&self) -> bool;

    /// One-shot read.
    async fn fetch_board(&self) -> Result<Board, CoreError>;

    /// Push deliveries until the returned handle is dropped or unsubscribed.
    fn subscribe(&self, on_change: BoardCallback) -> Subscription;

    /// Change one service's state. Never applied locally.
    async fn mutate(&self, id: &ServiceId, state: ServiceState) -> bool;

    /// Trigger an immediate re-read; results flow through subscriptions.
    async fn refresh_now(&self);
}

/// Select and build the source named in configuration.
pub fn build_source(config: &DashboardConfig) -> Result<Arc<dyn StatusSource>, CoreError> {
    let transport = config.transport();
    let source: Arc<dyn StatusSource> = match config.source {
        SourceKind::Polling => Arc::new(PollingSource::new(PollingClient::new(
            &config.polling,
            &transport,
        )?)),
        SourceKind::Live => Arc::new(LiveSource::new(LiveClient::new(&config.backend, &transport))),
    };
    Ok(source)
}

// ── Polling adapter ──────────────────────────────────────────────────

pub struct PollingSource {
    client: PollingClient,
}

impl PollingSource {
    pub fn new(client: PollingClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PollingClient {
        &self.client
    }
}

#[async_trait]
impl StatusSource for PollingSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Polling
    }

    fn can_mutate(&self) -> bool {
        false
    }

    async fn fetch_board(&self) -> Result<Board, CoreError> {
        let (status, stats) = tokio::join!(self.client.refresh_status(), self.client.refresh_stats());
        let status = status?;
        Ok(Board::from_snapshot(&status, stats.ok().as_deref()))
    }

    fn subscribe(&self, on_change: BoardCallback) -> Subscription {
        let mut status_rx = self.client.status();
        let mut stats_rx = self.client.stats();
        // Late subscribers get the current state without waiting a full period.
        status_rx.mark_changed();

        let loops = self.client.start();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    changed = status_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let status = status_rx.borrow_and_update().clone();
                        let stats = stats_rx.borrow().clone();
                        deliver_status(&status, &stats, &on_change);
                    }
                    changed = stats_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let stats = stats_rx.borrow_and_update().clone();
                        let status = status_rx.borrow().clone();
                        if let FetchState::Ready { data, .. } = &status {
                            on_change(Ok(Board::from_snapshot(data, stats.data().map(|s| &**s))));
                        }
                    }
                }
            }
            loops.unsubscribe();
        });

        Subscription::new("polling", cancel)
    }

    async fn mutate(&self, id: &ServiceId, _state: ServiceState) -> bool {
        warn!(%id, "polling source is read-only, ignoring status change");
        false
    }

    async fn refresh_now(&self) {
        self.client.refresh_now().await;
    }
}

fn deliver_status(
    status: &FetchState<StatusSnapshot>,
    stats: &FetchState<PlatformStats>,
    on_change: &BoardCallback,
) {
    match status {
        FetchState::Loading => {}
        FetchState::Failed(error) | FetchState::Stale { error, .. } => on_change(Err(error.clone())),
        FetchState::Ready { data, .. } => {
            on_change(Ok(Board::from_snapshot(data, stats.data().map(|s| &**s))));
        }
    }
}

// ── Live adapter ─────────────────────────────────────────────────────

pub struct LiveSource {
    client: LiveClient,
}

impl LiveSource {
    pub fn new(client: LiveClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &LiveClient {
        &self.client
    }
}

/// Placeholder data stands in only when an unconfigured backend yields nothing.
fn live_board(rows: Vec<ServiceStatus>, mode: BackendMode) -> Board {
    if rows.is_empty() && mode == BackendMode::Unconfigured {
        Board::placeholder()
    } else {
        Board::from_services(rows)
    }
}

#[async_trait]
impl StatusSource for LiveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn can_mutate(&self) -> bool {
        self.client.mode() == BackendMode::Configured
    }

    async fn fetch_board(&self) -> Result<Board, CoreError> {
        Ok(live_board(self.client.fetch_all().await, self.client.mode()))
    }

    fn subscribe(&self, on_change: BoardCallback) -> Subscription {
        let mode = self.client.mode();
        self.client
            .subscribe(move |rows| on_change(Ok(live_board(rows, mode))))
    }

    async fn mutate(&self, id: &ServiceId, state: ServiceState) -> bool {
        self.client.update_one(id, state).await
    }

    async fn refresh_now(&self) {
        self.client.request_refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_live_source_shows_placeholder() {
        let config = DashboardConfig {
            source: SourceKind::Live,
            ..DashboardConfig::default()
        };
        let source = build_source(&config).unwrap_or_else(|e| panic!("build failed: {e}"));
        assert_eq!(source.kind(), SourceKind::Live);
        assert!(!source.can_mutate());

        let board = source.fetch_board().await.unwrap_or_else(|e| panic!("fetch failed: {e}"));
        assert!(board.is_placeholder());
        assert!(!source.mutate(&ServiceId::from("1"), ServiceState::Maintenance).await);
    }

    #[test]
    fn polling_source_is_read_only() {
        let source = build_source(&DashboardConfig::default())
            .unwrap_or_else(|e| panic!("build failed: {e}"));
        assert_eq!(source.kind(), SourceKind::Polling);
        assert!(!source.can_mutate());
    }
}
