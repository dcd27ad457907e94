//! Song metadata lookup client
//!
//! Fetches release date, lyrics and link for a `(group, title)` pair from the
//! external metadata service:
//!
//! ```text
//! GET {ENRICHMENT_API_URL}?group=Muse&song=Supermassive%20Black%20Hole
//!
//! { "releaseDate": "16.07.2006", "text": "Ooh baby...", "link": "https://..." }
//! ```
//!
//! The date field may also be spelled `release_date`. There is no retry; each
//! request is bounded by the configured timeout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mlib_common::config::EnrichmentConfig;
use mlib_common::time::release_date;
use serde::Deserialize;
use thiserror::Error;

const USER_AGENT: &str = concat!("mlib-api/", env!("CARGO_PKG_VERSION"));

/// Upstream error bodies longer than this are cut before logging
const MAX_LOGGED_ERROR_BODY: usize = 512;

/// Metadata lookup errors
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("metadata service returned status {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Enrichment fields returned by the metadata service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetails {
    #[serde(default, alias = "release_date", deserialize_with = "release_date::deserialize")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}

/// Source of enrichment data for new songs
#[async_trait]
pub trait SongEnricher: Send + Sync {
    async fn fetch_details(&self, group: &str, title: &str)
        -> Result<SongDetails, EnrichmentError>;
}

/// HTTP client for the metadata service
pub struct HttpEnrichmentClient {
    http_client: reqwest::Client,
    api_url: String,
}

impl HttpEnrichmentClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl SongEnricher for HttpEnrichmentClient {
    async fn fetch_details(
        &self,
        group: &str,
        title: &str,
    ) -> Result<SongDetails, EnrichmentError> {
        tracing::debug!(group = %group, title = %title, url = %self.api_url, "Querying metadata service");

        let mut response = self
            .http_client
            .get(&self.api_url)
            .query(&[("group", group), ("song", title)])
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // One chunk is enough for a diagnostic; the body is never forwarded
            let head = response.chunk().await.ok().flatten().unwrap_or_default();
            let head = &head[..head.len().min(MAX_LOGGED_ERROR_BODY)];
            tracing::debug!(
                status = status.as_u16(),
                body = %String::from_utf8_lossy(head),
                "Metadata service error response"
            );
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let details: SongDetails =
            serde_json::from_slice(&body).map_err(|e| EnrichmentError::Decode(e.to_string()))?;

        tracing::debug!(
            group = %group,
            title = %title,
            has_text = !details.text.is_empty(),
            "Retrieved song details"
        );

        Ok(details)
    }
}
