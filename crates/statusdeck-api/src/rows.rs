// Row-store HTTP client
//
// Talks to a PostgREST-style REST surface (`{base}/rest/v1/{table}`).
// The access key rides on every request as both the `apikey` header and a
// bearer token, injected once through the client's default headers.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::StatusRow;
use crate::transport::TransportConfig;

/// Raw HTTP client for one row-store table.
#[derive(Debug, Clone)]
pub struct RowStoreClient {
    http: reqwest::Client,
    base_url: Url,
    table: String,
}

#[derive(Serialize)]
struct StatusPatch<'a> {
    status: &'a str,
    updated_at: String,
}

impl RowStoreClient {
    /// Create a client that authenticates with `access_key`.
    pub fn new(
        base_url: Url,
        access_key: &SecretString,
        table: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(auth_headers(access_key)?)?;
        Ok(Self::with_client(http, base_url, table))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, table: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            table: table.into(),
        }
    }

    /// Build `{base}/rest/v1/{table}`.
    pub(crate) fn table_url(&self) -> Result<Url, Error> {
        let full = format!(
            "{}/rest/v1/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.table
        );
        Ok(Url::parse(&full)?)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// `GET /rest/v1/{table}?select=*&order=service.asc`
    ///
    /// Rows that don't match [`StatusRow`] are skipped with a warning so one
    /// malformed row can't blank the whole board.
    pub async fn list_rows(&self) -> Result<Vec<StatusRow>, Error> {
        let url = self.table_url()?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .query(&[("select", "*"), ("order", "service.asc")])
            .send()
            .await?;
        let values: Vec<serde_json::Value> = decode(resp, &url).await?;

        let rows = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<StatusRow>(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(error = %e, table = %self.table, "skipping malformed row");
                    None
                }
            })
            .collect();
        Ok(rows)
    }

    /// `PATCH /rest/v1/{table}?id=eq.{id}` with `{status, updated_at}`.
    ///
    /// Fails with [`Error::NoRowsMatched`] when the filter hit nothing.
    pub async fn update_status(
        &self,
        id: &str,
        status: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let url = self.table_url()?;
        debug!(id, status, "PATCH {}", url);

        let body = StatusPatch {
            status,
            updated_at: updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let resp = self
            .http
            .patch(url.clone())
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let updated: Vec<serde_json::Value> = decode(resp, &url).await?;
        if updated.is_empty() {
            return Err(Error::NoRowsMatched { id: id.to_owned() });
        }
        Ok(())
    }
}

fn auth_headers(access_key: &SecretString) -> Result<HeaderMap, Error> {
    let key = access_key.expose_secret();
    let mut apikey =
        HeaderValue::from_str(key).map_err(|e| Error::InvalidAccessKey(e.to_string()))?;
    apikey.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|e| Error::InvalidAccessKey(e.to_string()))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", apikey);
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

async fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    url: &Url,
) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn table_url_ignores_trailing_slash() {
        let client = RowStoreClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://abc.backend.example/").unwrap(),
            "statuses",
        );
        assert_eq!(
            client.table_url().unwrap().as_str(),
            "https://abc.backend.example/rest/v1/statuses"
        );
    }

    #[test]
    fn auth_headers_are_sensitive() {
        let key: SecretString = "anon-key".to_string().into();
        let headers = auth_headers(&key).unwrap();
        assert_eq!(headers["apikey"], "anon-key");
        assert_eq!(headers[AUTHORIZATION], "Bearer anon-key");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn control_characters_in_key_are_rejected() {
        let key: SecretString = "bad\nkey".to_string().into();
        assert!(matches!(auth_headers(&key), Err(Error::InvalidAccessKey(_))));
    }
}
