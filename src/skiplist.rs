//! Durable skip list: identities rejected on earlier runs.
//!
//! A plain JSON document with three string sets (`shows`, `movies`,
//! `continuous`), loaded once at process start and saved once at process
//! end. Membership is monotonic: there is no remove operation, and the file
//! is cleared externally when a rejection should be reconsidered.

use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::SkipDomain;

/// Rejected identities, one set per skip domain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkipList {
    #[serde(default)]
    pub shows: BTreeSet<String>,

    #[serde(default)]
    pub movies: BTreeSet<String>,

    #[serde(default)]
    pub continuous: BTreeSet<String>,
}

impl SkipList {
    /// Create an empty skip list
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the skip list from disk.
    ///
    /// A missing file yields an empty list; an unreadable or malformed file
    /// is logged and treated as empty rather than aborting the run.
    pub async fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }

        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read skip list, starting empty");
                return Self::new();
            }
        };

        // Acquiring the run lock creates the file, so a first run sees it
        // empty rather than absent
        if content.trim().is_empty() {
            return Self::new();
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(list) => {
                info!(
                    shows = list.shows.len(),
                    movies = list.movies.len(),
                    continuous = list.continuous.len(),
                    "Loaded skip list"
                );
                list
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse skip list, starting empty");
                Self::new()
            }
        }
    }

    /// Save the skip list to disk
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create skip list directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write skip list: {}", path.display()))?;

        info!(
            shows = self.shows.len(),
            movies = self.movies.len(),
            continuous = self.continuous.len(),
            "Saved skip list"
        );
        Ok(())
    }

    /// Check membership of a normalized identity key
    pub fn contains(&self, domain: SkipDomain, key: &str) -> bool {
        self.set(domain).contains(key)
    }

    /// Record a rejected identity. Returns true when newly added.
    pub fn insert(&mut self, domain: SkipDomain, key: &str) -> bool {
        self.set_mut(domain).insert(key.to_string())
    }

    /// Total number of skipped identities across all domains
    pub fn len(&self) -> usize {
        self.shows.len() + self.movies.len() + self.continuous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set(&self, domain: SkipDomain) -> &BTreeSet<String> {
        match domain {
            SkipDomain::Shows => &self.shows,
            SkipDomain::Movies => &self.movies,
            SkipDomain::Continuous => &self.continuous,
        }
    }

    fn set_mut(&mut self, domain: SkipDomain) -> &mut BTreeSet<String> {
        match domain {
            SkipDomain::Shows => &mut self.shows,
            SkipDomain::Movies => &mut self.movies,
            SkipDomain::Continuous => &mut self.continuous,
        }
    }
}

/// Exclusive advisory lock on the skip-list file, held for a whole run so
/// two concurrent runs cannot interleave their loads and saves.
pub struct SkipListGuard {
    _file: std::fs::File,
    path: PathBuf,
}

impl SkipListGuard {
    /// Acquire the lock, failing fast if another run already holds it
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create skip list directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open skip list: {}", path.display()))?;

        file.try_lock_exclusive().with_context(|| {
            format!(
                "Skip list {} is locked; is another run in progress?",
                path.display()
            )
        })?;

        // Lock is released when the file handle is dropped
        Ok(Self {
            _file: file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
