//! Cached metadata resolution.
//!
//! The resolver sits between the pipeline and the metadata service: it
//! memoizes decided outcomes (found or not-found) per domain for the life
//! of the process, degrades transport failures to [`Resolution::Unreachable`]
//! without caching them, and knows the anime fallback (a movie-shaped name
//! in an anime group often resolves as a show instead).

pub mod tmdb;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::{MetadataRecord, Resolution};

pub use tmdb::TmdbClient;

/// Search surface of the external metadata service
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Search movies by title, optionally narrowed by release year
    async fn search_movie(&self, title: &str, year: Option<i32>) -> Result<Vec<MetadataRecord>>;

    /// Combined search across movies and TV shows
    async fn search_multi(&self, title: &str) -> Result<Vec<MetadataRecord>>;
}

/// Memoizing front end over a [`MetadataService`].
///
/// Owned state, injected into the pipeline; all mutation happens from the
/// pipeline's single task. A cache key is written at most once per domain:
/// only decided outcomes are stored, so an unreachable service leaves the
/// key open for a later attempt.
pub struct MetadataResolver {
    service: Box<dyn MetadataService>,
    movie_cache: HashMap<(String, Option<i32>), Option<MetadataRecord>>,
    show_cache: HashMap<String, Option<MetadataRecord>>,
}

impl MetadataResolver {
    pub fn new(service: Box<dyn MetadataService>) -> Self {
        Self {
            service,
            movie_cache: HashMap::new(),
            show_cache: HashMap::new(),
        }
    }

    /// Resolve a movie by title and optional year; first result wins
    pub async fn resolve_movie(&mut self, title: &str, year: Option<i32>) -> Resolution {
        let key = (title.to_string(), year);
        if let Some(cached) = self.movie_cache.get(&key) {
            debug!(%title, "Movie cache hit");
            return decided(cached.clone());
        }

        match self.service.search_movie(title, year).await {
            Ok(results) => {
                let record = results.into_iter().next();
                self.movie_cache.insert(key, record.clone());
                decided(record)
            }
            Err(e) => {
                warn!(%title, error = %e, "Movie lookup failed, treating as unreachable");
                Resolution::Unreachable
            }
        }
    }

    /// Resolve a show by title via combined search, preferring TV-tagged
    /// results over whatever came first
    pub async fn resolve_show(&mut self, title: &str) -> Resolution {
        if let Some(cached) = self.show_cache.get(title) {
            debug!(%title, "Show cache hit");
            return decided(cached.clone());
        }

        match self.service.search_multi(title).await {
            Ok(results) => {
                let record = results
                    .iter()
                    .find(|r| r.is_tv())
                    .cloned()
                    .or_else(|| results.into_iter().next());
                self.show_cache.insert(title.to_string(), record.clone());
                decided(record)
            }
            Err(e) => {
                warn!(%title, error = %e, "Show lookup failed, treating as unreachable");
                Resolution::Unreachable
            }
        }
    }

    /// Resolve a continuous-channel title via combined search, preferring an
    /// exact case-insensitive name match.
    ///
    /// Deliberately uncached here: negative caching for this path is the
    /// caller's skip-list responsibility.
    pub async fn resolve_any(&mut self, title: &str) -> Resolution {
        match self.service.search_multi(title).await {
            Ok(results) => {
                let wanted = title.trim().to_lowercase();
                let record = results
                    .iter()
                    .find(|r| r.title.trim().to_lowercase() == wanted)
                    .cloned()
                    .or_else(|| results.into_iter().next());
                decided(record)
            }
            Err(e) => {
                warn!(%title, error = %e, "Combined lookup failed, treating as unreachable");
                Resolution::Unreachable
            }
        }
    }

    /// Resolve a feature, retrying as a show when a movie lookup finds
    /// nothing and the group label marks anime content
    pub async fn resolve_feature(
        &mut self,
        title: &str,
        year: Option<i32>,
        group: &str,
    ) -> Resolution {
        let resolution = self.resolve_movie(title, year).await;
        if resolution.is_not_found() && is_anime_group(group) {
            info!(%title, %group, "Movie lookup missed, retrying as show for anime group");
            return self.resolve_show(title).await;
        }
        resolution
    }
}

fn decided(record: Option<MetadataRecord>) -> Resolution {
    match record {
        Some(record) => Resolution::Found(record),
        None => Resolution::NotFound,
    }
}

/// True when any delimiter-split segment of the group label is exactly
/// "anime", case-insensitive
pub fn is_anime_group(group: &str) -> bool {
    group
        .split(['-', '_', '/', '\\'])
        .any(|part| part.trim().eq_ignore_ascii_case("anime"))
}
