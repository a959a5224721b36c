#![allow(clippy::unwrap_used)]
// Integration tests for `RowStoreClient` using wiremock.

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statusdeck_api::{Error, RowStoreClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RowStoreClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let key: SecretString = "anon-key".to_string().into();
    let client =
        RowStoreClient::new(base_url, &key, "statuses", &TransportConfig::default()).unwrap();
    (server, client)
}

const TABLE_PATH: &str = "/rest/v1/statuses";

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_rows_sends_credentials_and_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("select", "*"))
        .and(query_param("order", "service.asc"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "service": "API", "status": "Operational", "updated_at": "2026-01-01T12:00:00+00:00" },
            { "id": 2, "service": "DB", "status": "Major Outage", "updated_at": "2026-01-01T12:00:00+00:00" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client.list_rows().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "1");
    assert_eq!(rows[1].service, "DB");
    assert_eq!(rows[1].status, "Major Outage");
}

#[tokio::test]
async fn test_list_rows_skips_malformed_rows() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "service": "API", "status": "Operational", "updated_at": "2026-01-01T12:00:00Z" },
            { "id": "b", "status": "Operational" },
            "garbage"
        ])))
        .mount(&server)
        .await;

    let rows = client.list_rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "a");
}

#[tokio::test]
async fn test_list_rows_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid API key"})))
        .mount(&server)
        .await;

    let result = client.list_rows().await;
    assert!(
        matches!(result, Err(Error::HttpStatus { status: 401, .. })),
        "expected HttpStatus error, got: {result:?}"
    );
}

// ── Updates ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_status_patches_filtered_row() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.2"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({
            "status": "Operational",
            "updated_at": "2026-03-04T05:06:07.000Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "service": "DB", "status": "Operational", "updated_at": "2026-03-04T05:06:07+00:00" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
    client.update_status("2", "Operational", at).await.unwrap();
}

#[tokio::test]
async fn test_update_status_no_match() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = client.update_status("404", "Operational", Utc::now()).await;
    assert!(
        matches!(result, Err(Error::NoRowsMatched { ref id }) if id == "404"),
        "expected NoRowsMatched, got: {result:?}"
    );
}

#[tokio::test]
async fn test_update_status_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client.update_status("2", "Maintenance", Utc::now()).await;
    assert!(matches!(result, Err(Error::HttpStatus { status: 403, .. })));
}
