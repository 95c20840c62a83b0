//! Catalog source: where stream entries and their playable URLs come from.

pub mod dispatch;

use async_trait::async_trait;

use crate::domain::StreamEntry;
use crate::errors::PipelineError;

pub use dispatch::DispatchClient;

/// Remote catalog of stream groups and their entries
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List every group name the catalog offers
    async fn groups(&self) -> Result<Vec<String>, PipelineError>;

    /// List all entries in one group; pagination is internal
    async fn entries(&self, group: &str) -> Result<Vec<StreamEntry>, PipelineError>;

    /// The playable URL a reference file for this entry should point at
    fn playable_url(&self, entry: &StreamEntry) -> String;
}

/// Lightweight reachability check against a playable URL
#[async_trait]
pub trait LivenessProber: Send + Sync {
    /// Never errors: any failure reads as unreachable
    async fn is_reachable(&self, url: &str) -> bool;
}
