//! Background fetching of auxiliary assets (artwork, subtitles).
//!
//! Assets ride a fixed-size worker pool behind a bounded queue. Fetch
//! failures are logged and dropped; they never change what the pipeline
//! already decided for the entry that enqueued them.

pub mod store;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use store::{HttpAssetStore, SubtitleCredentials};

/// Default number of asset workers
pub const DEFAULT_WORKERS: usize = 8;
/// Default bounded queue depth
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Fetches asset payloads. Errors stop at the worker that hit them.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Raw bytes for an absolute asset URL
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// Subtitle text matching a query; `None` when nothing matched
    async fn fetch_subtitle(&self, query: &SubtitleQuery) -> Result<Option<String>>;
}

/// Search parameters for one subtitle lookup.
///
/// A TMDB id takes precedence over the free-text fields when both are set.
#[derive(Debug, Clone)]
pub struct SubtitleQuery {
    pub tmdb_id: Option<i64>,
    pub text: Option<String>,
    pub year: Option<i32>,
    pub season: Option<u8>,
    pub episode: Option<u8>,
    pub language: String,
}

impl SubtitleQuery {
    /// Movie lookup keyed by TMDB id, falling back to title and year
    pub fn movie(tmdb_id: Option<i64>, title: &str, year: Option<i32>) -> Self {
        Self {
            tmdb_id,
            text: Some(title.to_string()),
            year,
            season: None,
            episode: None,
            language: "en".to_string(),
        }
    }

    /// Episode lookup keyed by show TMDB id plus season/episode numbers
    pub fn episode(tmdb_id: Option<i64>, show: &str, season: u8, episode: u8) -> Self {
        Self {
            tmdb_id,
            text: Some(show.to_string()),
            year: None,
            season: Some(season),
            episode: Some(episode),
            language: "en".to_string(),
        }
    }
}

/// One unit of background work
#[derive(Debug)]
pub enum AssetJob {
    /// Download an image to `destination`
    Image { url: String, destination: PathBuf },
    /// Fetch a subtitle to `destination`
    Subtitle {
        query: SubtitleQuery,
        destination: PathBuf,
    },
}

impl AssetJob {
    fn destination(&self) -> &Path {
        match self {
            Self::Image { destination, .. } | Self::Subtitle { destination, .. } => destination,
        }
    }
}

/// Fixed-size background pool with a bounded queue.
///
/// `enqueue` applies backpressure once the queue is full instead of
/// growing without bound. `drain` closes the queue and waits for the
/// workers to finish everything still in flight, so a run never exits
/// with half-written assets pending.
pub struct AssetPool {
    sender: Option<mpsc::Sender<AssetJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl AssetPool {
    /// Spawn `workers` tasks sharing one bounded queue
    pub fn start(store: Arc<dyn AssetStore>, workers: usize, queue_depth: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let handles = (0..workers.max(1))
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    debug!(worker_id, "Asset worker started");
                    loop {
                        let job = { receiver.lock().await.recv().await };
                        match job {
                            Some(job) => run_job(store.as_ref(), job).await,
                            None => break,
                        }
                    }
                    debug!(worker_id, "Asset worker stopped");
                })
            })
            .collect();
        Self {
            sender: Some(sender),
            workers: handles,
        }
    }

    /// Queue one fetch; waits only when the queue is at capacity
    pub async fn enqueue(&self, job: AssetJob) {
        if let Some(sender) = &self.sender {
            if sender.send(job).await.is_err() {
                warn!("Asset queue is closed, dropping job");
            }
        }
    }

    /// Close the queue and wait for all outstanding work to finish
    pub async fn drain(mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.await.is_err() {
                warn!("Asset worker ended abnormally");
            }
        }
    }
}

async fn run_job(store: &dyn AssetStore, job: AssetJob) {
    if job.destination().exists() {
        debug!(path = %job.destination().display(), "Asset already present, skipping");
        return;
    }
    let destination = job.destination().to_path_buf();
    match fetch_and_write(store, job).await {
        Ok(true) => info!(path = %destination.display(), "Fetched asset"),
        Ok(false) => debug!(path = %destination.display(), "No payload for asset"),
        Err(error) => {
            warn!(path = %destination.display(), %error, "Asset fetch failed")
        }
    }
}

/// Returns whether anything was written
async fn fetch_and_write(store: &dyn AssetStore, job: AssetJob) -> Result<bool> {
    match job {
        AssetJob::Image { url, destination } => {
            let bytes = store.fetch_bytes(&url).await?;
            write_atomic(&destination, &bytes)?;
            Ok(true)
        }
        AssetJob::Subtitle { query, destination } => match store.fetch_subtitle(&query).await? {
            Some(text) => {
                write_atomic(&destination, text.as_bytes())?;
                Ok(true)
            }
            None => Ok(false),
        },
    }
}

/// Stage the payload in a temp file beside the destination so readers
/// never observe a partial asset
fn write_atomic(destination: &Path, bytes: &[u8]) -> Result<()> {
    let parent = destination
        .parent()
        .context("Asset destination has no parent directory")?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    let mut staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    staged
        .write_all(bytes)
        .with_context(|| format!("Failed to write asset for {}", destination.display()))?;
    staged
        .persist(destination)
        .with_context(|| format!("Failed to move asset into place at {}", destination.display()))?;
    Ok(())
}
