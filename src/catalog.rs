//! Map catalog: the list of map names offered when building a pool.
//!
//! DESIGN
//! ======
//! The HTTP client is a thin wrapper around the provider's `/maps` endpoint.
//! Filtering and sorting live in `parse_maps` so they are testable without a
//! network. Handlers depend on the [`MapCatalog`] trait, never the client.

use std::time::Duration;

use serde::Deserialize;

use crate::config::CatalogConfig;

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Provider entries that are not competitive maps.
pub const EXCLUDED_MAPS: [&str; 11] = [
    "The Range",
    "Basic Training",
    "KAY/O",
    "District",
    "Kasbah",
    "Piazza",
    "Drift",
    "Glitch",
    "Skirmish A",
    "Skirmish B",
    "Skirmish C",
];

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Request(String),
    #[error("catalog responded with status {status}")]
    Response { status: u16 },
    #[error("catalog response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::frame::ErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_CATALOG_REQUEST",
            Self::Response { .. } => "E_CATALOG_RESPONSE",
            Self::Parse(_) => "E_CATALOG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599 })
    }
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait MapCatalog: Send + Sync {
    /// Competitive map names, sorted.
    async fn map_names(&self) -> Result<Vec<String>, CatalogError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpCatalog {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    /// # Errors
    ///
    /// Returns [`CatalogError::HttpClientBuild`] if the client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait::async_trait]
impl MapCatalog for HttpCatalog {
    async fn map_names(&self) -> Result<Vec<String>, CatalogError> {
        let response = self
            .http
            .get(format!("{}/maps", self.base_url))
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(CatalogError::Response { status });
        }

        let text = response
            .text()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;
        parse_maps(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
struct MapsResponse {
    #[serde(default)]
    data: Vec<MapEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapEntry {
    #[serde(default)]
    display_name: Option<String>,
}

/// Extract, filter, dedupe, and sort map names from a `/maps` body.
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] when the body is not the expected JSON.
pub fn parse_maps(body: &str) -> Result<Vec<String>, CatalogError> {
    let parsed: MapsResponse = serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;
    let mut names: Vec<String> = parsed
        .data
        .into_iter()
        .filter_map(|entry| entry.display_name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && !EXCLUDED_MAPS.contains(&name.as_str()))
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
