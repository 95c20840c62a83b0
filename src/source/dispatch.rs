//! HTTP client for the stream catalog API.
//!
//! Handles token auth (JWT bearer with one transparent re-auth on 401),
//! the group listing, page-walking entry fetches, and playable-URL
//! construction from the configured stream base.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::StreamEntry;
use crate::errors::PipelineError;
use crate::source::{CatalogSource, LivenessProber};

const GROUPS_ENDPOINT: &str = "api/channels/streams/groups/";
const STREAMS_ENDPOINT: &str = "api/channels/streams/";
const PAGE_SIZE: u32 = 250;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for a Dispatcharr-compatible catalog server
pub struct DispatchClient {
    /// Server root, no trailing slash
    api_base: String,
    /// Token endpoint relative to the server root
    token_endpoint: String,
    /// Playable-URL prefix; absolute, or relative to the server root
    stream_base: String,
    username: Option<String>,
    password: Option<String>,
    client: reqwest::Client,
    /// Cached access token; cleared when the server rejects it
    access_token: Mutex<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access: String,
}

#[derive(Debug, Deserialize)]
struct StreamPage {
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    results: Vec<WireStream>,
}

#[derive(Debug, Deserialize)]
struct WireStream {
    id: i64,
    name: String,
    stream_hash: String,
}

impl DispatchClient {
    /// Create a new catalog client
    pub fn new(
        api_base: impl Into<String>,
        token_endpoint: impl Into<String>,
        stream_base: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, PipelineError> {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        if api_base.is_empty() {
            return Err(PipelineError::ConfigMissing("api_base"));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            api_base,
            token_endpoint: token_endpoint.into().trim_start_matches('/').to_string(),
            stream_base: stream_base.into(),
            username,
            password,
            client,
            access_token: Mutex::new(None),
        })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base, endpoint)
    }

    fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Current access token, fetching one if credentials are configured
    /// and none is cached. Anonymous servers get `None`.
    async fn token(&self) -> Result<Option<String>, PipelineError> {
        let (username, password) = match (&self.username, &self.password) {
            (Some(username), Some(password)) => (username, password),
            _ => return Ok(None),
        };
        let mut cached = self.access_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(Some(token.clone()));
        }
        debug!(endpoint = %self.token_endpoint, "Requesting access token");
        let response = self
            .client
            .post(self.api_url(&self.token_endpoint))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?
            .error_for_status()?;
        let tokens: TokenResponse = response.json().await?;
        *cached = Some(tokens.access.clone());
        Ok(Some(tokens.access))
    }

    async fn authorized_get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, PipelineError> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = self.token().await? {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// GET with bearer auth, re-authenticating once if the token is stale
    async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T, PipelineError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut response = self.authorized_get(url, query).await?;
        if response.status() == StatusCode::UNAUTHORIZED && self.has_credentials() {
            debug!(url, "Access token rejected, re-authenticating");
            *self.access_token.lock().await = None;
            response = self.authorized_get(url, query).await?;
        }
        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogSource for DispatchClient {
    async fn groups(&self) -> Result<Vec<String>, PipelineError> {
        self.get_json(&self.api_url(GROUPS_ENDPOINT), &[]).await
    }

    async fn entries(&self, group: &str) -> Result<Vec<StreamEntry>, PipelineError> {
        let url = self.api_url(STREAMS_ENDPOINT);
        let mut entries = Vec::new();
        let mut page: u32 = 1;
        loop {
            let query = [
                ("page", page.to_string()),
                ("page_size", PAGE_SIZE.to_string()),
                ("ordering", "name".to_string()),
                ("channel_group", group.to_string()),
            ];
            let batch: StreamPage = self.get_json(&url, &query).await?;
            entries.extend(batch.results.into_iter().map(|stream| StreamEntry {
                id: stream.id,
                name: stream.name,
                group: group.to_string(),
                stream_hash: stream.stream_hash,
            }));
            if batch.next.is_none() {
                break;
            }
            page += 1;
        }
        debug!(group, count = entries.len(), "Fetched catalog entries");
        Ok(entries)
    }

    fn playable_url(&self, entry: &StreamEntry) -> String {
        let base = if self.stream_base.starts_with("http") {
            self.stream_base.clone()
        } else {
            format!("{}/{}", self.api_base, self.stream_base.trim_start_matches('/'))
        };
        format!("{}{}", base, entry.stream_hash)
    }
}

#[async_trait]
impl LivenessProber for DispatchClient {
    async fn is_reachable(&self, url: &str) -> bool {
        let probe = self
            .client
            .head(url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;
        match probe {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                warn!(url, %error, "Liveness probe failed");
                false
            }
        }
    }
}
