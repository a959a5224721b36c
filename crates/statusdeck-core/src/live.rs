// ── Live status client ──
//
// Row store + realtime channel. Reads degrade to an empty list instead of
// failing; every change notice (and every channel join) triggers a full
// re-read. An unconfigured backend is a first-class mode, not an error.

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use statusdeck_api::realtime::{self, ChannelConfig, RealtimeHandle, ReconnectConfig};
use statusdeck_api::{RowStoreClient, TransportConfig};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{BackendConfig, BackendEndpoint, BackendMode};
use crate::convert::services_from_rows;
use crate::error::CoreError;
use crate::model::{ServiceId, ServiceState, ServiceStatus};
use crate::subscription::Subscription;

/// Cheaply cloneable handle to the live client.
#[derive(Clone)]
pub struct LiveClient {
    inner: Arc<LiveInner>,
}

struct LiveInner {
    backend: Backend,
    /// Bumped by every refresh request; each subscription keeps its own
    /// receiver so a request made mid-read is still seen afterwards.
    refresh: watch::Sender<u64>,
}

enum Backend {
    Unconfigured,
    Connected(Connected),
}

struct Connected {
    rows: RowStoreClient,
    realtime_url: Url,
    access_key: SecretString,
    channel: ChannelConfig,
    reconnect: ReconnectConfig,
}

impl Connected {
    fn build(endpoint: &BackendEndpoint, transport: &TransportConfig) -> Result<Self, CoreError> {
        let rows = RowStoreClient::new(
            endpoint.url.clone(),
            &endpoint.access_key,
            endpoint.table.clone(),
            transport,
        )?;
        let realtime_url = match &endpoint.realtime_url {
            Some(url) => realtime::with_credentials(url.clone(), &endpoint.access_key),
            None => realtime::endpoint_url(&endpoint.url, &endpoint.access_key)?,
        };
        Ok(Self {
            rows,
            realtime_url,
            access_key: endpoint.access_key.clone(),
            channel: ChannelConfig::for_table(&endpoint.channel, &endpoint.table),
            reconnect: ReconnectConfig::default(),
        })
    }
}

impl LiveClient {
    /// Build from backend settings. Never fails: anything unusable becomes
    /// [`BackendMode::Unconfigured`] with a warning.
    pub fn new(backend: &BackendConfig, transport: &TransportConfig) -> Self {
        let backend = match backend {
            BackendConfig::Unconfigured => {
                warn!("live backend not configured, reads will be empty");
                Backend::Unconfigured
            }
            BackendConfig::Configured(endpoint) => match Connected::build(endpoint, transport) {
                Ok(connected) => Backend::Connected(connected),
                Err(e) => {
                    warn!(error = %e, "live backend unusable, treating as unconfigured");
                    Backend::Unconfigured
                }
            },
        };
        Self {
            inner: Arc::new(LiveInner {
                backend,
                refresh: watch::Sender::new(0),
            }),
        }
    }

    pub fn unconfigured() -> Self {
        Self::new(&BackendConfig::Unconfigured, &TransportConfig::default())
    }

    pub fn mode(&self) -> BackendMode {
        match self.inner.backend {
            Backend::Unconfigured => BackendMode::Unconfigured,
            Backend::Connected(_) => BackendMode::Configured,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// All valid rows, ordered by service name. Empty on any failure.
    pub async fn fetch_all(&self) -> Vec<ServiceStatus> {
        let Backend::Connected(backend) = &self.inner.backend else {
            warn!("fetch skipped: live backend not configured");
            return Vec::new();
        };

        match backend.rows.list_rows().await {
            Ok(rows) => {
                let services = services_from_rows(rows);
                debug!(count = services.len(), "fetched status rows");
                services
            }
            Err(e) => {
                warn!(error = %e, "status rows fetch failed, returning empty set");
                Vec::new()
            }
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Set one row's state and stamp `updated_at` with the current time.
    /// The change is not applied locally; it arrives via the next read.
    pub async fn update_one(&self, id: &ServiceId, state: ServiceState) -> bool {
        let Backend::Connected(backend) = &self.inner.backend else {
            warn!(%id, "update skipped: live backend not configured");
            return false;
        };

        match backend
            .rows
            .update_status(id.as_str(), state.row_label(), Utc::now())
            .await
        {
            Ok(()) => {
                info!(%id, %state, "service status updated");
                true
            }
            Err(e) => {
                warn!(%id, %state, error = %e, "service status update failed");
                false
            }
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Open one realtime channel and deliver a fresh row set after every
    /// change notice, including the one announcing each (re)join.
    /// Deliveries are serialized; bursts of notices or refresh requests that
    /// arrive during a read collapse into one more read.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(Vec<ServiceStatus>) + Send + Sync + 'static,
    {
        let Backend::Connected(backend) = &self.inner.backend else {
            warn!("subscribe skipped: live backend not configured");
            return Subscription::inert("live");
        };

        let cancel = CancellationToken::new();
        let handle = RealtimeHandle::spawn(
            backend.realtime_url.clone(),
            backend.access_key.clone(),
            backend.channel.clone(),
            backend.reconnect.clone(),
            cancel.child_token(),
        );
        let mut notices = handle.subscribe();
        let mut refresh = self.inner.refresh.subscribe();
        let client = self.clone();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    changed = refresh.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    received = notices.recv() => {
                        if let Err(RecvError::Closed) = received {
                            break;
                        }
                    }
                }
                drain(&mut notices);
                refresh.borrow_and_update();

                let rows = client.fetch_all().await;
                if task_cancel.is_cancelled() {
                    debug!("discarding rows fetched after unsubscribe");
                    break;
                }
                on_change(rows);
            }
            handle.shutdown();
            debug!("live subscription task exiting");
        });

        Subscription::new("live", cancel)
    }

    /// Ask every active subscription to re-read now.
    pub fn request_refresh(&self) {
        self.inner.refresh.send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

fn drain(notices: &mut tokio::sync::broadcast::Receiver<Arc<realtime::ChangeNotice>>) {
    loop {
        match notices.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_degrades() {
        let client = LiveClient::unconfigured();
        assert_eq!(client.mode(), BackendMode::Unconfigured);
        assert!(client.fetch_all().await.is_empty());
        assert!(!client.update_one(&ServiceId::from("1"), ServiceState::Operational).await);

        let sub = client.subscribe(|_| panic!("inert subscription must not deliver"));
        assert!(!sub.is_active());
        sub.unsubscribe();
    }
}
