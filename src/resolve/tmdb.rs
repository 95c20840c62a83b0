//! TMDB search client.
//!
//! Thin typed wrapper over the two search endpoints the resolver needs,
//! plus the image URL scheme the asset fetcher uses.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::MetadataService;
use crate::domain::MetadataRecord;

const API_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// TMDB API client
pub struct TmdbClient {
    /// API key sent as a query parameter on every request
    api_key: String,
    /// BCP 47 language tag for localized fields
    language: String,
    /// Image size segment (`w500`, `original`, ...)
    image_size: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Envelope TMDB wraps every search response in
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MetadataRecord>,
}

impl TmdbClient {
    /// Create a new client; the request timeout is fixed at 10 seconds
    pub fn new(api_key: String, language: String, image_size: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build TMDB HTTP client")?;

        Ok(Self {
            api_key,
            language,
            image_size,
            client,
        })
    }

    /// Build a full image URL from a record's poster/backdrop path
    pub fn image_url(&self, image_path: &str) -> String {
        image_url(&self.image_size, image_path)
    }

    async fn search(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<MetadataRecord>> {
        let response = self
            .client
            .get(format!("{API_BASE}{endpoint}"))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(query)
            .send()
            .await
            .with_context(|| format!("TMDB request failed: {endpoint}"))?
            .error_for_status()
            .with_context(|| format!("TMDB returned an error status: {endpoint}"))?;

        let parsed: SearchResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse TMDB response: {endpoint}"))?;

        Ok(parsed.results)
    }
}

#[async_trait]
impl MetadataService for TmdbClient {
    async fn search_movie(&self, title: &str, year: Option<i32>) -> Result<Vec<MetadataRecord>> {
        let mut query = vec![("query", title.to_string())];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }
        self.search("/search/movie", &query).await
    }

    async fn search_multi(&self, title: &str) -> Result<Vec<MetadataRecord>> {
        self.search("/search/multi", &[("query", title.to_string())])
            .await
    }
}

/// Full image URL for a poster/backdrop path at the given size
pub fn image_url(image_size: &str, image_path: &str) -> String {
    format!("{IMAGE_BASE}/{image_size}{image_path}")
}
