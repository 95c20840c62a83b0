//! Configuration for strmforge.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (STRMFORGE_API_BASE, STRMFORGE_USERNAME,
//!    STRMFORGE_PASSWORD, STRMFORGE_TMDB_API_KEY,
//!    STRMFORGE_OPENSUBTITLES_API_KEY, STRMFORGE_DESTINATION_ROOT)
//! 2. Config file (.strmforge/config.yaml)
//! 3. Built-in defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .strmforge/config.yaml
//! - Falls back to ~/.strmforge/config.yaml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::assets::SubtitleCredentials;
use crate::errors::PipelineError;
use crate::filter::AcceptancePolicy;

const SKIP_CACHE_FILENAME: &str = "skip_cache.json";

/// All recognized settings, with serde defaults matching a bare file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catalog server root, e.g. `http://dispatch.local:9191`
    pub api_base: Option<String>,
    /// Token endpoint relative to `api_base`
    pub token_endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Playable-URL prefix; absolute, or relative to `api_base`
    pub stream_base: String,
    /// Skip the pre-write reachability probe
    pub skip_liveness_check: bool,

    /// Glob patterns selecting which catalog groups to process
    pub group_patterns: Vec<String>,
    /// Substrings removed from stream names before classification
    pub strings_to_remove: Vec<String>,

    /// Library root all artifacts land under
    pub destination_root: Option<PathBuf>,
    /// Skip-list location; defaults to `<destination_root>/skip_cache.json`
    pub skip_cache_file: Option<PathBuf>,

    /// TMDB v3 API key; absent disables metadata resolution
    pub tmdb_api_key: Option<String>,
    pub tmdb_language: String,
    pub tmdb_image_size: String,
    /// Fetch poster/backdrop artwork for resolved entries
    pub download_images: bool,

    /// Language accepted entries must match; defaults to `tmdb_language`
    pub target_language: Option<String>,
    pub minimum_rating: f64,
    pub minimum_votes: u64,
    pub minimum_popularity: f64,
    pub minimum_year: i32,

    pub write_sidecars: bool,
    pub write_sidecars_only_if_missing: bool,
    /// Materialize entries the metadata service has no record of
    pub create_artifacts_for_unmatched: bool,

    pub opensubtitles_api_key: Option<String>,
    pub opensubtitles_user_agent: String,
    pub opensubtitles_username: Option<String>,
    pub opensubtitles_password: Option<String>,
    pub download_subtitles: bool,

    /// Background asset workers
    pub asset_workers: usize,
    /// Bounded asset queue depth
    pub asset_queue_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: None,
            token_endpoint: "api/token/".to_string(),
            username: None,
            password: None,
            stream_base: "proxy/ts/stream/".to_string(),
            skip_liveness_check: false,
            group_patterns: vec!["*".to_string()],
            strings_to_remove: Vec::new(),
            destination_root: None,
            skip_cache_file: None,
            tmdb_api_key: None,
            tmdb_language: "en-US".to_string(),
            tmdb_image_size: "original".to_string(),
            download_images: true,
            target_language: None,
            minimum_rating: 0.0,
            minimum_votes: 0,
            minimum_popularity: 0.0,
            minimum_year: 0,
            write_sidecars: true,
            write_sidecars_only_if_missing: false,
            create_artifacts_for_unmatched: false,
            opensubtitles_api_key: None,
            opensubtitles_user_agent: format!("strmforge v{}", env!("CARGO_PKG_VERSION")),
            opensubtitles_username: None,
            opensubtitles_password: None,
            download_subtitles: false,
            asset_workers: crate::assets::DEFAULT_WORKERS,
            asset_queue_depth: crate::assets::DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl Settings {
    /// Catalog server root, required by anything that talks to the catalog
    pub fn api_base(&self) -> Result<&str, PipelineError> {
        self.api_base
            .as_deref()
            .filter(|base| !base.is_empty())
            .ok_or(PipelineError::ConfigMissing("api_base"))
    }

    /// Library root, required before any artifact can be written
    pub fn destination_root(&self) -> Result<&Path, PipelineError> {
        self.destination_root
            .as_deref()
            .ok_or(PipelineError::ConfigMissing("destination_root"))
    }

    /// Skip-list path, explicit or derived from the destination root
    pub fn skip_cache_file(&self) -> Result<PathBuf, PipelineError> {
        match &self.skip_cache_file {
            Some(path) => Ok(path.clone()),
            None => Ok(self.destination_root()?.join(SKIP_CACHE_FILENAME)),
        }
    }

    /// Everything a `run` cannot start without
    pub fn validate_for_run(&self) -> Result<(), PipelineError> {
        self.api_base()?;
        self.destination_root()?;
        Ok(())
    }

    /// Acceptance thresholds for the filter stage
    pub fn acceptance_policy(&self) -> AcceptancePolicy {
        AcceptancePolicy {
            minimum_rating: self.minimum_rating,
            minimum_votes: self.minimum_votes,
            minimum_popularity: self.minimum_popularity,
            minimum_year: self.minimum_year,
            target_language: self
                .target_language
                .clone()
                .unwrap_or_else(|| self.tmdb_language.clone()),
        }
    }

    /// Subtitle credentials, present only when every required field is set
    pub fn subtitle_credentials(&self) -> Option<SubtitleCredentials> {
        match (
            &self.opensubtitles_api_key,
            &self.opensubtitles_username,
            &self.opensubtitles_password,
        ) {
            (Some(api_key), Some(username), Some(password)) => Some(SubtitleCredentials {
                api_key: api_key.clone(),
                app_name: self.opensubtitles_user_agent.clone(),
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// True when subtitle downloads are switched on and fully configured
    pub fn subtitles_enabled(&self) -> bool {
        self.download_subtitles && self.subtitle_credentials().is_some()
    }

    /// True when artwork downloads are switched on and the resolver can run
    pub fn images_enabled(&self) -> bool {
        self.download_images && self.tmdb_api_key.is_some()
    }
}

/// Find a config file by searching current directory and parents,
/// then the home directory
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let candidate = current.join(".strmforge").join("config.yaml");
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                break;
            }
        }
    }

    let home_candidate = dirs::home_dir()?.join(".strmforge").join("config.yaml");
    home_candidate.exists().then_some(home_candidate)
}

/// Load and parse one config file
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(value) = std::env::var("STRMFORGE_API_BASE") {
        settings.api_base = Some(value);
    }
    if let Ok(value) = std::env::var("STRMFORGE_USERNAME") {
        settings.username = Some(value);
    }
    if let Ok(value) = std::env::var("STRMFORGE_PASSWORD") {
        settings.password = Some(value);
    }
    if let Ok(value) = std::env::var("STRMFORGE_TMDB_API_KEY") {
        settings.tmdb_api_key = Some(value);
    }
    if let Ok(value) = std::env::var("STRMFORGE_OPENSUBTITLES_API_KEY") {
        settings.opensubtitles_api_key = Some(value);
    }
    if let Ok(value) = std::env::var("STRMFORGE_DESTINATION_ROOT") {
        settings.destination_root = Some(PathBuf::from(value));
    }
}

/// Load settings, then apply environment overrides. An explicit path must
/// exist; otherwise the file is discovered, and no file at all yields the
/// built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match explicit {
        Some(path) => load_settings_file(path)?,
        None => match find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                load_settings_file(&path)?
            }
            None => Settings::default(),
        },
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}
