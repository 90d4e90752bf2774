// Fetch layer: typed access to the public Fantasy Premier League API.
//
// `FplSource` is the seam between the services and the network so the
// services can run against an in-memory source in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use fplscout_core::config::ApiConfig;
use fplscout_core::raw::{RawBootstrap, RawEntry, RawFixture, RawPicks};

const USER_AGENT: &str = concat!("fplscout/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// True for a 404, which upstream returns for unknown entries and
    /// gameweeks that have not been played yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}

/// Read-only source of raw league data.
#[async_trait]
pub trait FplSource: Send + Sync {
    /// League-wide players, teams and gameweeks.
    async fn bootstrap(&self) -> Result<RawBootstrap, FetchError>;

    async fn fixtures(&self) -> Result<Vec<RawFixture>, FetchError>;

    async fn entry(&self, entry_id: u32) -> Result<RawEntry, FetchError>;

    async fn picks(&self, entry_id: u32, event: u32) -> Result<RawPicks, FetchError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

pub struct HttpFplSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFplSource {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;
        debug!(%url, bytes = body.len(), "response received");

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

#[async_trait]
impl FplSource for HttpFplSource {
    async fn bootstrap(&self) -> Result<RawBootstrap, FetchError> {
        self.get_json("bootstrap-static/").await
    }

    async fn fixtures(&self) -> Result<Vec<RawFixture>, FetchError> {
        self.get_json("fixtures/").await
    }

    async fn entry(&self, entry_id: u32) -> Result<RawEntry, FetchError> {
        self.get_json(&format!("entry/{entry_id}/")).await
    }

    async fn picks(&self, entry_id: u32, event: u32) -> Result<RawPicks, FetchError> {
        self.get_json(&format!("entry/{entry_id}/event/{event}/picks/"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        let source = HttpFplSource::new(&api_config("https://example.test/api/")).unwrap();
        assert_eq!(
            source.url("entry/7/event/3/picks/"),
            "https://example.test/api/entry/7/event/3/picks/"
        );
    }

    #[test]
    fn not_found_detection() {
        let err = FetchError::Status {
            url: "u".into(),
            status: 404,
        };
        assert!(err.is_not_found());
        let err = FetchError::Status {
            url: "u".into(),
            status: 503,
        };
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 on localhost is the discard service; nothing listens there in CI.
        let source = HttpFplSource::new(&api_config("http://127.0.0.1:9")).unwrap();
        let err = source.bootstrap().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }), "got {err:?}");
    }
}
