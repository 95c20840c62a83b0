//! HTTP-backed asset retrieval: artwork downloads and OpenSubtitles lookups.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::assets::{AssetStore, SubtitleQuery};

const OPENSUBTITLES_BASE: &str = "https://api.opensubtitles.com/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials for the OpenSubtitles REST API
#[derive(Debug, Clone)]
pub struct SubtitleCredentials {
    pub api_key: String,
    pub app_name: String,
    pub username: String,
    pub password: String,
}

/// Fetches artwork over plain HTTP and subtitles from OpenSubtitles.
///
/// Subtitle support is optional; without credentials every subtitle
/// fetch fails with a configuration error that the pool logs and drops.
pub struct HttpAssetStore {
    client: reqwest::Client,
    subtitles: Option<SubtitleCredentials>,
    /// Session token from the login endpoint, fetched once per process
    token: Mutex<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct SubtitleSearchResponse {
    #[serde(default)]
    data: Vec<SubtitleHit>,
}

#[derive(Debug, Deserialize)]
struct SubtitleHit {
    attributes: SubtitleAttributes,
}

#[derive(Debug, Deserialize)]
struct SubtitleAttributes {
    #[serde(default)]
    files: Vec<SubtitleFile>,
}

#[derive(Debug, Deserialize)]
struct SubtitleFile {
    file_id: i64,
}

#[derive(Debug, Deserialize)]
struct DownloadResponse {
    link: String,
}

impl HttpAssetStore {
    pub fn new(subtitles: Option<SubtitleCredentials>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for asset fetches")?;
        Ok(Self {
            client,
            subtitles,
            token: Mutex::new(None),
        })
    }

    async fn login(&self, credentials: &SubtitleCredentials) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        debug!("Logging in to the subtitle service");
        let response = self
            .client
            .post(format!("{OPENSUBTITLES_BASE}/login"))
            .header("Api-Key", &credentials.api_key)
            .header("User-Agent", &credentials.app_name)
            .json(&serde_json::json!({
                "username": credentials.username,
                "password": credentials.password,
            }))
            .send()
            .await
            .context("OpenSubtitles login request failed")?
            .error_for_status()
            .context("OpenSubtitles rejected the login")?;
        let login: LoginResponse = response
            .json()
            .await
            .context("Malformed OpenSubtitles login response")?;
        *cached = Some(login.token.clone());
        Ok(login.token)
    }

    fn search_params(query: &SubtitleQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("languages", query.language.clone())];
        if let Some(id) = query.tmdb_id {
            params.push(("tmdb_id", id.to_string()));
        } else if let Some(text) = &query.text {
            params.push(("query", text.clone()));
            if let Some(year) = query.year {
                params.push(("year", year.to_string()));
            }
        }
        if let Some(season) = query.season {
            params.push(("season_number", season.to_string()));
        }
        if let Some(episode) = query.episode {
            params.push(("episode_number", episode.to_string()));
        }
        params
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch asset from {url}"))?
            .error_for_status()
            .with_context(|| format!("Asset request rejected for {url}"))?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read asset bytes from {url}"))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_subtitle(&self, query: &SubtitleQuery) -> Result<Option<String>> {
        let credentials = match &self.subtitles {
            Some(credentials) => credentials,
            None => bail!("Subtitle service is not configured"),
        };
        let token = self.login(credentials).await?;

        let results: SubtitleSearchResponse = self
            .client
            .get(format!("{OPENSUBTITLES_BASE}/subtitles"))
            .header("Api-Key", &credentials.api_key)
            .header("User-Agent", &credentials.app_name)
            .query(&Self::search_params(query))
            .send()
            .await
            .context("OpenSubtitles search request failed")?
            .error_for_status()
            .context("OpenSubtitles search failed")?
            .json()
            .await
            .context("Malformed OpenSubtitles search response")?;

        let file_id = results
            .data
            .first()
            .and_then(|hit| hit.attributes.files.first())
            .map(|file| file.file_id);
        let file_id = match file_id {
            Some(file_id) => file_id,
            None => {
                debug!(query = ?query.text, "No subtitle results");
                return Ok(None);
            }
        };

        let download: DownloadResponse = self
            .client
            .post(format!("{OPENSUBTITLES_BASE}/download"))
            .header("Api-Key", &credentials.api_key)
            .header("User-Agent", &credentials.app_name)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "file_id": file_id }))
            .send()
            .await
            .context("OpenSubtitles download request failed")?
            .error_for_status()
            .context("OpenSubtitles download request rejected")?
            .json()
            .await
            .context("Malformed OpenSubtitles download response")?;

        let text = self
            .client
            .get(&download.link)
            .send()
            .await
            .context("Subtitle payload request failed")?
            .error_for_status()
            .context("Subtitle payload request rejected")?
            .text()
            .await
            .context("Failed to read subtitle payload")?;
        Ok(Some(text))
    }
}
