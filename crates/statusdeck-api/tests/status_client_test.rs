#![allow(clippy::unwrap_used)]
// Integration tests for `StatusApiClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statusdeck_api::{Error, StatusApiClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StatusApiClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let client = StatusApiClient::with_client(
        reqwest::Client::new(),
        base.join("/api/status").unwrap(),
        base.join("/api/stats/platform").unwrap(),
    );
    (server, client)
}

// ── Status document ─────────────────────────────────────────────────

#[tokio::test]
async fn test_get_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overall_status": "degraded",
            "message": "Some systems degraded",
            "components": [
                { "name": "API", "status": "operational", "last_updated": "2026-01-01T12:00:00Z" },
                { "name": "DB", "status": "degraded", "last_updated": "2026-01-01T12:00:00Z" }
            ],
            "incidents": [],
            "maintenance_events": [],
            "last_updated": "2026-01-01T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();
    assert_eq!(status.overall_status, "degraded");
    assert_eq!(status.components.len(), 2);
    assert_eq!(status.components[1].name, "DB");
    assert!(status.incidents.is_empty());
}

#[tokio::test]
async fn test_get_status_with_incident() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overall_status": "outage",
            "components": [],
            "incidents": [{
                "id": 41,
                "title": "Login failures",
                "status": "investigating",
                "description": "Users report 500s on sign-in",
                "created_at": "2026-01-01T11:00:00Z",
                "updated_at": "2026-01-01T11:30:00Z"
            }],
            "maintenance_events": []
        })))
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();
    assert_eq!(status.incidents.len(), 1);
    assert_eq!(status.incidents[0].id, "41");
    assert_eq!(status.incidents[0].status, "investigating");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let result = client.get_status().await;
    assert!(
        matches!(result, Err(Error::HttpStatus { status: 503, .. })),
        "expected HttpStatus error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client.get_status().await.unwrap_err();
    assert!(err.is_decode(), "expected decode error, got: {err:?}");
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("maintenance")),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ── Platform stats ──────────────────────────────────────────────────

#[tokio::test]
async fn test_get_platform_stats() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stats/platform"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalUsers": "12.4k",
            "activeUsers": "1.1k",
            "totalPosts": "3,210",
            "totalTickets": "88",
            "totalPartners": "14",
            "lastUpdated": "2026-01-01T12:00:00Z"
        })))
        .mount(&server)
        .await;

    let stats = client.get_platform_stats().await.unwrap();
    assert_eq!(stats.total_users.as_deref(), Some("12.4k"));
    assert_eq!(stats.total_posts.as_deref(), Some("3,210"));
    assert_eq!(stats.total_events, None);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = StatusApiClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9/api/status").unwrap(),
        Url::parse("http://127.0.0.1:9/api/stats/platform").unwrap(),
    );

    let err = client.get_status().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert!(!err.is_decode());
}
