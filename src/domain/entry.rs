//! Raw catalog entries and their classified identities.

use serde::{Deserialize, Serialize};

/// A raw catalog item, one per stream the remote API lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEntry {
    /// Upstream numeric id
    pub id: i64,

    /// Display name exactly as delivered, before any cleaning
    pub name: String,

    /// Group label the entry was listed under
    pub group: String,

    /// Opaque hash the playable URL is derived from
    pub stream_hash: String,
}

/// Content identity parsed out of an entry name and its group label.
///
/// Derived deterministically by the classifier and never persisted; the
/// sanitized title/show doubles as the cache and skip-list key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifiedIdentity {
    /// An always-on channel rather than discrete content
    Continuous { title: String },

    /// One episode of a show
    Episode { show: String, season: u8, episode: u8 },

    /// A movie, with a release year when the name carried one
    Feature { title: String, year: Option<i32> },
}

impl ClassifiedIdentity {
    /// Normalized identity key used for caching and skip-list membership
    pub fn key(&self) -> &str {
        match self {
            Self::Continuous { title } => title,
            Self::Episode { show, .. } => show,
            Self::Feature { title, .. } => title,
        }
    }

    /// Which persistent skip set this identity belongs to
    pub fn skip_domain(&self) -> SkipDomain {
        match self {
            Self::Continuous { .. } => SkipDomain::Continuous,
            Self::Episode { .. } => SkipDomain::Shows,
            Self::Feature { .. } => SkipDomain::Movies,
        }
    }
}

/// The three skip-list domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipDomain {
    Shows,
    Movies,
    Continuous,
}
