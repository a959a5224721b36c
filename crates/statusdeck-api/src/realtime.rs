//! Phoenix-channel realtime client with auto-reconnect.
//!
//! Connects to a realtime websocket endpoint, joins one channel configured
//! for postgres change events on a single table, keeps the socket alive with
//! heartbeats, and announces every change through a
//! [`tokio::sync::broadcast`] channel. Reconnects with exponential backoff +
//! jitter when the socket drops.
//!
//! Notices carry the change kind only. Consumers re-read the table to get
//! the authoritative rows. Every acknowledged join (including rejoins after
//! a reconnect) also produces a [`ChangeKind::Subscribed`] notice, since
//! changes made while the socket was down are never replayed.
//!
//! # Example
//!
//! ```rust,ignore
//! use statusdeck_api::realtime::{ChannelConfig, RealtimeHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let ws_url = realtime::endpoint_url(&base_url, &access_key)?;
//! let handle = RealtimeHandle::spawn(
//!     ws_url,
//!     access_key,
//!     ChannelConfig::for_table("realtime-status", "statuses"),
//!     ReconnectConfig::default(),
//!     CancellationToken::new(),
//! );
//! let mut rx = handle.subscribe();
//! while let Ok(notice) = rx.recv().await {
//!     println!("{:?} on {:?}", notice.kind, notice.table);
//! }
//! handle.shutdown();
//! ```

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Constants ────────────────────────────────────────────────────────

const NOTICE_CHANNEL_CAPACITY: usize = 64;
const PROTOCOL_VERSION: &str = "1.0.0";
const HEARTBEAT_TOPIC: &str = "phoenix";

// ── ChannelConfig ────────────────────────────────────────────────────

/// Which channel to join and which table changes to listen for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Full Phoenix topic, e.g. `"realtime:realtime-status"`.
    pub topic: String,
    pub schema: String,
    pub table: String,
    /// Change filter: `"*"`, `"INSERT"`, `"UPDATE"` or `"DELETE"`.
    pub event: String,
    pub heartbeat_interval: Duration,
}

impl ChannelConfig {
    /// Listen for every change on `public.{table}` over channel `name`.
    pub fn for_table(name: &str, table: &str) -> Self {
        Self {
            topic: format!("realtime:{name}"),
            schema: "public".into(),
            table: table.into(),
            event: "*".into(),
            heartbeat_interval: Duration::from_secs(30),
        }
    }

    fn join_payload(&self, access_key: &SecretString) -> serde_json::Value {
        json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": self.event,
                    "schema": self.schema,
                    "table": self.table,
                }],
            },
            "access_token": access_key.expose_secret(),
        })
    }
}

// ── ChangeNotice ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    Other,
    /// The channel was joined or rejoined; anything may have changed.
    Subscribed,
}

impl ChangeKind {
    fn from_wire(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }
}

/// A row changed somewhere in the watched table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub kind: ChangeKind,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub commit_timestamp: Option<String>,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for websocket reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── Endpoint construction ────────────────────────────────────────────

/// Derive the realtime endpoint from a backend base URL:
/// `https://host` becomes `wss://host/realtime/v1/websocket?apikey=..&vsn=1.0.0`.
pub fn endpoint_url(base_url: &Url, access_key: &SecretString) -> Result<Url, Error> {
    let scheme = match base_url.scheme() {
        "http" | "ws" => "ws",
        _ => "wss",
    };
    let host = base_url
        .host_str()
        .ok_or_else(|| Error::WebSocketConnect(format!("{base_url} has no host")))?;
    let authority = match base_url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    };
    let url = Url::parse(&format!("{scheme}://{authority}/realtime/v1/websocket"))?;
    Ok(with_credentials(url, access_key))
}

/// Append `apikey` and `vsn` to an explicit realtime URL unless already present.
pub fn with_credentials(mut url: Url, access_key: &SecretString) -> Url {
    let has = |name: &str| url.query_pairs().any(|(k, _)| k == name);
    let needs_key = !has("apikey");
    let needs_vsn = !has("vsn");
    {
        let mut pairs = url.query_pairs_mut();
        if needs_key {
            pairs.append_pair("apikey", access_key.expose_secret());
        }
        if needs_vsn {
            pairs.append_pair("vsn", PROTOCOL_VERSION);
        }
    }
    url
}

// ── RealtimeHandle ───────────────────────────────────────────────────

/// Handle to a running realtime channel.
///
/// Call [`shutdown`](Self::shutdown) to leave the channel and close the
/// socket. The background task sends `phx_leave` and a close frame once,
/// then exits.
pub struct RealtimeHandle {
    notice_rx: broadcast::Receiver<Arc<ChangeNotice>>,
    cancel: CancellationToken,
}

impl RealtimeHandle {
    /// Spawn the connection loop. Returns immediately; the first connection
    /// attempt happens in the background.
    pub fn spawn(
        ws_url: Url,
        access_key: SecretString,
        channel: ChannelConfig,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (notice_tx, notice_rx) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let session = Session {
                url: ws_url,
                access_key,
                channel,
                notice_tx,
            };
            realtime_loop(session, reconnect, task_cancel).await;
        });

        Self { notice_rx, cancel }
    }

    /// Get a new receiver for change notices.
    ///
    /// If a consumer falls behind it receives
    /// [`broadcast::error::RecvError::Lagged`]; any lag still means "re-read".
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChangeNotice>> {
        self.notice_rx.resubscribe()
    }

    /// Signal the background task to leave the channel and exit.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

// ── Background reconnection loop ─────────────────────────────────────

struct Session {
    url: Url,
    access_key: SecretString,
    channel: ChannelConfig,
    notice_tx: broadcast::Sender<Arc<ChangeNotice>>,
}

/// How a single connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Cancelled by the owner; the channel was left and the socket closed.
    Cancelled,
    /// The server closed the socket or the stream ended.
    Disconnected,
}

/// Main loop: connect → join → read → backoff → reconnect.
///
/// Every reconnect waits, whether the socket failed or the server closed it
/// cleanly. The attempt counter resets only after a session was joined.
async fn realtime_loop(session: Session, reconnect: ReconnectConfig, cancel: CancellationToken) {
    let mut attempt: u32 = 0;

    loop {
        let mut joined = false;
        let outcome = run_session(&session, &cancel, &mut joined).await;
        if joined {
            attempt = 0;
        }

        match outcome {
            Ok(SessionEnd::Cancelled) => break,
            Ok(SessionEnd::Disconnected) => {
                tracing::info!(topic = %session.channel.topic, joined, "realtime socket closed");
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, joined, "realtime channel error");
            }
        }

        if let Some(max) = reconnect.max_retries {
            if attempt >= max {
                tracing::error!(max_retries = max, "realtime reconnection limit reached, giving up");
                break;
            }
        }

        let delay = calculate_backoff(attempt, &reconnect);
        tracing::info!(delay_ms = delay.as_millis(), attempt, "waiting before reconnect");

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        attempt = attempt.saturating_add(1);
    }

    tracing::debug!(topic = %session.channel.topic, "realtime loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Connect, join the channel, and pump frames until the socket drops or the
/// owner cancels. `joined` is set once the server acknowledges the join.
async fn run_session(
    session: &Session,
    cancel: &CancellationToken,
    joined: &mut bool,
) -> Result<SessionEnd, Error> {
    tracing::info!(url = %redacted(&session.url), "connecting to realtime endpoint");

    let connect = tokio_tungstenite::connect_async(session.url.as_str());
    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
        result = connect => result.map_err(|e| Error::WebSocketConnect(e.to_string()))?,
    };

    let (mut write, mut read) = ws_stream.split();
    let topic = session.channel.topic.as_str();
    let mut refs = RefCounter::default();

    let join_ref = refs.next();
    let join = PhoenixFrame::new(
        topic,
        "phx_join",
        session.channel.join_payload(&session.access_key),
        Some(join_ref.clone()),
    );
    send_frame(&mut write, &join).await?;
    tracing::debug!(topic, "phx_join sent");

    let period = session.channel.heartbeat_interval;
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                leave(&mut write, topic, refs.next()).await;
                return Ok(SessionEnd::Cancelled);
            }
            _ = heartbeat.tick() => {
                let frame = PhoenixFrame::new(HEARTBEAT_TOPIC, "heartbeat", json!({}), Some(refs.next()));
                send_frame(&mut write, &frame).await?;
                tracing::trace!("heartbeat sent");
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if handle_text(&text, topic, &join_ref, &session.notice_tx)? {
                            *joined = true;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "realtime close frame received");
                        } else {
                            tracing::info!("realtime close frame received (no payload)");
                        }
                        return Ok(SessionEnd::Disconnected);
                    }
                    Some(Ok(Message::Ping(_))) => tracing::trace!("realtime ping"),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
                    None => {
                        tracing::info!("realtime stream ended");
                        return Ok(SessionEnd::Disconnected);
                    }
                }
            }
        }
    }
}

/// Best-effort `phx_leave` + close frame. Failures only get logged: the
/// socket is going away either way.
async fn leave<S>(write: &mut S, topic: &str, reference: String)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let frame = PhoenixFrame::new(topic, "phx_leave", json!({}), Some(reference));
    if let Err(e) = send_frame(write, &frame).await {
        tracing::debug!(error = %e, "phx_leave not delivered");
    }
    if let Err(e) = write.send(Message::Close(None)).await {
        tracing::debug!(error = %e, "close frame not delivered");
    }
    tracing::info!(topic, "left realtime channel");
}

async fn send_frame<S>(write: &mut S, frame: &PhoenixFrame) -> Result<(), Error>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let text = serde_json::to_string(frame).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: String::new(),
    })?;
    write
        .send(Message::text(text))
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))
}

fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

// ── Phoenix frames ───────────────────────────────────────────────────

/// Wire envelope for protocol version 1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PhoenixFrame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl PhoenixFrame {
    fn new(topic: &str, event: &str, payload: serde_json::Value, reference: Option<String>) -> Self {
        Self {
            topic: topic.to_owned(),
            event: event.to_owned(),
            payload,
            reference,
        }
    }
}

#[derive(Debug, Default)]
struct RefCounter(u64);

impl RefCounter {
    fn next(&mut self) -> String {
        self.0 += 1;
        self.0.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ChangePayload {
    data: ChangeData,
}

#[derive(Debug, Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    commit_timestamp: Option<String>,
}

/// Route one inbound text frame. Returns `true` when the frame acknowledged
/// our join. A rejected join or a crashed channel ends the session.
fn handle_text(
    text: &str,
    topic: &str,
    join_ref: &str,
    notice_tx: &broadcast::Sender<Arc<ChangeNotice>>,
) -> Result<bool, Error> {
    let frame: PhoenixFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse realtime frame");
            return Ok(false);
        }
    };

    if frame.topic != topic {
        // heartbeat replies land on "phoenix"
        return Ok(false);
    }

    match frame.event.as_str() {
        "postgres_changes" => {
            if let Some(notice) = parse_change(&frame.payload) {
                tracing::debug!(kind = ?notice.kind, table = ?notice.table, "change notice");
                let _ = notice_tx.send(Arc::new(notice));
            }
        }
        "phx_reply" if frame.reference.as_deref() == Some(join_ref) => {
            let status = frame.payload["status"].as_str().unwrap_or("");
            if status == "ok" {
                tracing::info!(topic, "joined realtime channel");
                let _ = notice_tx.send(Arc::new(ChangeNotice {
                    kind: ChangeKind::Subscribed,
                    schema: None,
                    table: None,
                    commit_timestamp: None,
                }));
                return Ok(true);
            }
            return Err(Error::Channel {
                topic: topic.to_owned(),
                message: frame.payload["response"].to_string(),
            });
        }
        "phx_error" => {
            return Err(Error::Channel {
                topic: topic.to_owned(),
                message: "channel crashed".into(),
            });
        }
        "phx_close" => {
            return Err(Error::WebSocketClosed {
                code: 1000,
                reason: "channel closed by server".into(),
            });
        }
        "system" => {
            if frame.payload["status"].as_str() == Some("error") {
                tracing::warn!(payload = %frame.payload, "realtime system error");
            }
        }
        other => tracing::trace!(event = other, "ignoring realtime event"),
    }
    Ok(false)
}

fn parse_change(payload: &serde_json::Value) -> Option<ChangeNotice> {
    match serde_json::from_value::<ChangePayload>(payload.clone()) {
        Ok(p) => Some(ChangeNotice {
            kind: ChangeKind::from_wire(&p.data.kind),
            schema: p.data.schema,
            table: p.data.table,
            commit_timestamp: p.data.commit_timestamp,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "postgres_changes payload without data");
            None
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 ± 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    Duration::from_secs_f64((capped * jitter_factor).max(0.0))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key() -> SecretString {
        "anon-key".to_string().into()
    }

    #[test]
    fn channel_config_defaults() {
        let config = ChannelConfig::for_table("realtime-status", "statuses");
        assert_eq!(config.topic, "realtime:realtime-status");
        assert_eq!(config.schema, "public");
        assert_eq!(config.event, "*");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
    }

    #[test]
    fn join_payload_requests_postgres_changes() {
        let config = ChannelConfig::for_table("realtime-status", "statuses");
        let payload = config.join_payload(&key());
        let changes = &payload["config"]["postgres_changes"][0];
        assert_eq!(changes["event"], "*");
        assert_eq!(changes["schema"], "public");
        assert_eq!(changes["table"], "statuses");
        assert_eq!(payload["access_token"], "anon-key");
    }

    #[test]
    fn endpoint_from_https_base() {
        let base = Url::parse("https://abc.backend.example").unwrap();
        let url = endpoint_url(&base, &key()).unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/realtime/v1/websocket");
        assert_eq!(url.query(), Some("apikey=anon-key&vsn=1.0.0"));
    }

    #[test]
    fn endpoint_from_http_base_keeps_port() {
        let base = Url::parse("http://127.0.0.1:54321").unwrap();
        let url = endpoint_url(&base, &key()).unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:54321/realtime/v1/websocket?apikey=anon-key&vsn=1.0.0");
    }

    #[test]
    fn explicit_url_keeps_existing_params() {
        let url = Url::parse("wss://rt.example/socket?vsn=2.0.0").unwrap();
        let url = with_credentials(url, &key());
        assert_eq!(url.query(), Some("vsn=2.0.0&apikey=anon-key"));
    }

    #[test]
    fn redacted_url_hides_key() {
        let url = Url::parse("wss://rt.example/realtime/v1/websocket?apikey=secret&vsn=1.0.0").unwrap();
        assert!(!redacted(&url).contains("secret"));
    }

    #[test]
    fn frame_serializes_ref_field() {
        let frame = PhoenixFrame::new("phoenix", "heartbeat", json!({}), Some("3".into()));
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value, json!({"topic": "phoenix", "event": "heartbeat", "payload": {}, "ref": "3"}));
    }

    #[test]
    fn change_frame_is_broadcast() {
        let (tx, mut rx) = broadcast::channel(4);
        let raw = json!({
            "topic": "realtime:realtime-status",
            "event": "postgres_changes",
            "payload": {
                "data": {
                    "type": "UPDATE",
                    "schema": "public",
                    "table": "statuses",
                    "commit_timestamp": "2026-01-01T00:00:00Z",
                    "record": {"id": 2, "status": "Operational"}
                },
                "ids": [7]
            },
            "ref": null
        });

        assert!(!handle_text(&raw.to_string(), "realtime:realtime-status", "1", &tx).unwrap());

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.kind, ChangeKind::Update);
        assert_eq!(notice.table.as_deref(), Some("statuses"));
    }

    #[test]
    fn other_topics_are_ignored() {
        let (tx, mut rx) = broadcast::channel::<Arc<ChangeNotice>>(4);
        let raw = json!({
            "topic": "phoenix",
            "event": "phx_reply",
            "payload": {"status": "ok", "response": {}},
            "ref": "1"
        });
        assert!(!handle_text(&raw.to_string(), "realtime:realtime-status", "1", &tx).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn accepted_join_announces_resubscribe() {
        let (tx, mut rx) = broadcast::channel(4);
        let raw = json!({
            "topic": "realtime:realtime-status",
            "event": "phx_reply",
            "payload": {"status": "ok", "response": {"postgres_changes": []}},
            "ref": "1"
        });
        assert!(handle_text(&raw.to_string(), "realtime:realtime-status", "1", &tx).unwrap());
        assert_eq!(rx.try_recv().unwrap().kind, ChangeKind::Subscribed);
    }

    #[test]
    fn reply_to_other_ref_is_not_a_join() {
        let (tx, mut rx) = broadcast::channel::<Arc<ChangeNotice>>(4);
        let raw = json!({
            "topic": "realtime:realtime-status",
            "event": "phx_reply",
            "payload": {"status": "ok", "response": {}},
            "ref": "5"
        });
        assert!(!handle_text(&raw.to_string(), "realtime:realtime-status", "1", &tx).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rejected_join_is_an_error() {
        let (tx, _rx) = broadcast::channel(4);
        let raw = json!({
            "topic": "realtime:realtime-status",
            "event": "phx_reply",
            "payload": {"status": "error", "response": {"reason": "unauthorized"}},
            "ref": "1"
        });
        let err = handle_text(&raw.to_string(), "realtime:realtime-status", "1", &tx).unwrap_err();
        assert!(matches!(err, Error::Channel { .. }), "got {err:?}");
    }

    #[test]
    fn malformed_frames_are_skipped() {
        let (tx, mut rx) = broadcast::channel::<Arc<ChangeNotice>>(4);
        assert!(!handle_text("not json at all", "realtime:realtime-status", "1", &tx).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn backoff_increases_then_caps() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };
        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);
        assert!(d1 > d0, "d1 ({d1:?}) should exceed d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should exceed d1 ({d1:?})");
        assert!(calculate_backoff(40, &config) <= Duration::from_millis(12_500));
    }
}
