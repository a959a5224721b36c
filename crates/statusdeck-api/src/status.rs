// Status API HTTP client
//
// Two read-only JSON endpoints: the service status document and the
// platform statistics document. Anything but a 2xx is an error; the body
// is decoded only after the status check.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{PlatformStatsResponse, StatusResponse};
use crate::transport::TransportConfig;

/// Raw HTTP client for the status and platform-stats endpoints.
#[derive(Debug, Clone)]
pub struct StatusApiClient {
    http: reqwest::Client,
    status_url: Url,
    stats_url: Url,
}

impl StatusApiClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(status_url: Url, stats_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, status_url, stats_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, status_url: Url, stats_url: Url) -> Self {
        Self {
            http,
            status_url,
            stats_url,
        }
    }

    pub fn status_url(&self) -> &Url {
        &self.status_url
    }

    pub fn stats_url(&self) -> &Url {
        &self.stats_url
    }

    /// `GET {status_url}`
    pub async fn get_status(&self) -> Result<StatusResponse, Error> {
        self.get_json(self.status_url.clone()).await
    }

    /// `GET {stats_url}`
    pub async fn get_platform_stats(&self) -> Result<PlatformStatsResponse, Error> {
        self.get_json(self.stats_url.clone()).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url.clone()).send().await?;
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
}
