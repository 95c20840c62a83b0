//! Error taxonomy for the materialization pipeline.
//!
//! Every per-entry failure is mapped to one of these variants where it
//! occurs and caught at the pipeline's entry boundary, so a single bad
//! entry never stops the pass over a group. Only `ConfigMissing` aborts
//! startup.

use std::path::PathBuf;

use thiserror::Error;

/// Failures an entry can hit on its way through the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network or service-level failure; degraded to unreachable/not-found
    /// semantics by callers, never fatal to a run
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream service answered but had no matching entity
    #[error("Not found upstream: {0}")]
    NotFound(String),

    /// A write or directory operation failed; fatal for the entry only
    #[error("Filesystem failure at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required setting is absent; fatal at startup
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),
}

impl PipelineError {
    /// Wrap an I/O error with the path it happened on
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}
