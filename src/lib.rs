//! strmforge - build a .strm media library from a live-stream catalog
//!
//! Fetches stream listings from a Dispatcharr-compatible catalog API,
//! classifies each name as a movie, an episode, or an always-on channel,
//! resolves it against TMDB, and materializes reference files plus NFO
//! sidecars under a player-style directory tree.
//!
//! # Architecture
//!
//! One pass works as a funnel:
//! - Entries are fetched per group and classified deterministically
//! - Identities already on the persistent skip list drop out before
//!   any metadata lookup
//! - Survivors are resolved, filtered by acceptance thresholds, and
//!   written as `.strm` references with optional `.nfo` sidecars
//! - Artwork and subtitles download on a background worker pool
//!
//! # Modules
//!
//! - `source`: catalog API client and liveness probing
//! - `classify`: stream-name parsing into content identities
//! - `resolve`: TMDB search with per-run memoization
//! - `filter`: acceptance thresholds for resolved metadata
//! - `library`: directory layout, sidecar rendering, artifact writing
//! - `assets`: background artwork and subtitle downloads
//! - `skiplist`: persistent negative cache
//! - `pipeline`: orchestration of one full pass
//!
//! # Usage
//!
//! ```bash
//! # Build the library
//! strmforge run
//!
//! # See which groups the configured patterns select
//! strmforge groups
//!
//! # Check how one name classifies
//! strmforge classify "24/7 Alien (1979)"
//! ```

pub mod assets;
pub mod classify;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod library;
pub mod pipeline;
pub mod resolve;
pub mod skiplist;
pub mod source;

// Re-export main types at crate root for convenience
pub use domain::{ClassifiedIdentity, MetadataRecord, Resolution, SkipDomain, StreamEntry};
pub use errors::PipelineError;
pub use filter::{AcceptancePolicy, Rejection};
pub use pipeline::{Pipeline, RunSummary};
pub use skiplist::{SkipList, SkipListGuard};
