// ── Polling status client ──
//
// Periodically fetches the status document and the platform stats into two
// independent feeds. Each feed has its own cadence and its own sequencer.
// One pair of loops runs per client no matter how many callers start it.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use statusdeck_api::{StatusApiClient, TransportConfig};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollingConfig;
use crate::error::CoreError;
use crate::model::{PlatformStats, StatusSnapshot};
use crate::store::{FetchState, Feed};
use crate::subscription::Subscription;

/// Cheaply cloneable handle to the polling client.
#[derive(Clone)]
pub struct PollingClient {
    inner: Arc<PollingInner>,
}

struct PollingInner {
    api: StatusApiClient,
    status_every: Duration,
    stats_every: Duration,
    status: Feed<StatusSnapshot>,
    stats: Feed<PlatformStats>,
    schedule: Mutex<Schedule>,
}

/// Loops shared by every holder of a [`PollingClient::start`] handle.
#[derive(Default)]
struct Schedule {
    users: usize,
    cancel: Option<CancellationToken>,
}

impl PollingClient {
    pub fn new(config: &PollingConfig, transport: &TransportConfig) -> Result<Self, CoreError> {
        let api = StatusApiClient::new(
            config.status_url.clone(),
            config.stats_url.clone(),
            transport,
        )?;
        Ok(Self::with_api(api, config))
    }

    /// Build around an existing API client (tests, custom transports).
    pub fn with_api(api: StatusApiClient, config: &PollingConfig) -> Self {
        Self {
            inner: Arc::new(PollingInner {
                api,
                status_every: config.effective_status_interval(),
                stats_every: config.effective_stats_interval(),
                status: Feed::new("status"),
                stats: Feed::new("stats"),
                schedule: Mutex::default(),
            }),
        }
    }

    // ── State access ─────────────────────────────────────────────────

    pub fn status(&self) -> watch::Receiver<FetchState<StatusSnapshot>> {
        self.inner.status.subscribe()
    }

    pub fn stats(&self) -> watch::Receiver<FetchState<PlatformStats>> {
        self.inner.stats.subscribe()
    }

    pub fn status_state(&self) -> FetchState<StatusSnapshot> {
        self.inner.status.current()
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// One status fetch through the sequencer. The returned result is this
    /// request's own outcome, even if a newer response won the feed.
    pub async fn refresh_status(&self) -> Result<Arc<StatusSnapshot>, CoreError> {
        let seq = self.inner.status.begin();
        debug!(seq, "fetching status");
        let result = self
            .inner
            .api
            .get_status()
            .await
            .map(|resp| Arc::new(StatusSnapshot::from(resp)))
            .map_err(CoreError::from);
        if let Err(ref e) = result {
            warn!(error = %e, "status fetch failed");
        }
        self.inner.status.complete(seq, result.clone());
        result
    }

    pub async fn refresh_stats(&self) -> Result<Arc<PlatformStats>, CoreError> {
        let seq = self.inner.stats.begin();
        debug!(seq, "fetching platform stats");
        let result = self
            .inner
            .api
            .get_platform_stats()
            .await
            .map(|resp| Arc::new(PlatformStats::from(resp)))
            .map_err(CoreError::from);
        if let Err(ref e) = result {
            warn!(error = %e, "platform stats fetch failed");
        }
        self.inner.stats.complete(seq, result.clone());
        result
    }

    /// Fetch status and stats now, concurrently.
    pub async fn refresh_now(&self) {
        let _ = tokio::join!(self.refresh_status(), self.refresh_stats());
    }

    // ── Scheduling ───────────────────────────────────────────────────

    /// Start both polling loops, or join the ones already running. The loops
    /// stop once every returned handle is dropped or unsubscribed; in-flight
    /// requests still complete.
    pub fn start(&self) -> Subscription {
        self.acquire_loops();

        let cancel = CancellationToken::new();
        let released = cancel.clone();
        let client = self.clone();
        tokio::spawn(async move {
            released.cancelled().await;
            client.release_loops();
        });
        Subscription::new("polling", cancel)
    }

    fn schedule(&self) -> MutexGuard<'_, Schedule> {
        self.inner.schedule.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire_loops(&self) {
        let mut schedule = self.schedule();
        schedule.users += 1;
        if schedule.cancel.is_none() {
            let cancel = CancellationToken::new();
            self.spawn_loops(&cancel);
            schedule.cancel = Some(cancel);
        } else {
            debug!(users = schedule.users, "joining running polling loops");
        }
    }

    fn release_loops(&self) {
        let mut schedule = self.schedule();
        schedule.users = schedule.users.saturating_sub(1);
        if schedule.users > 0 {
            return;
        }
        if let Some(cancel) = schedule.cancel.take() {
            debug!("last polling handle released, stopping loops");
            cancel.cancel();
        }
    }

    fn spawn_loops(&self, cancel: &CancellationToken) {
        info!(
            status_secs = self.inner.status_every.as_secs(),
            stats_secs = self.inner.stats_every.as_secs(),
            "starting polling loops"
        );

        let client = self.clone();
        let immediate = !self.inner.status.has_data();
        tokio::spawn(poll_loop(
            self.inner.status_every,
            immediate,
            cancel.clone(),
            move || {
                let client = client.clone();
                async move {
                    let _ = client.refresh_status().await;
                }
            },
        ));

        let client = self.clone();
        let immediate = !self.inner.stats.has_data();
        tokio::spawn(poll_loop(
            self.inner.stats_every,
            immediate,
            cancel.clone(),
            move || {
                let client = client.clone();
                async move {
                    let _ = client.refresh_stats().await;
                }
            },
        ));
    }
}

/// Run `tick` every `period` until cancelled. The first run is immediate
/// unless the feed already holds data.
async fn poll_loop<F, Fut>(period: Duration, immediate: bool, cancel: CancellationToken, tick: F)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let start = if immediate {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => tick().await,
        }
    }
    debug!("polling loop exiting");
}
