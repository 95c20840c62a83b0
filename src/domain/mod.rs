//! Domain types for the strmforge pipeline.
//!
//! This module contains the core data structures:
//! - StreamEntry: a raw catalog item as the remote API delivers it
//! - ClassifiedIdentity: the parsed content identity of an entry
//! - MetadataRecord / Resolution: the outcome of a metadata lookup

pub mod entry;
pub mod metadata;

// Re-export commonly used types
pub use entry::{ClassifiedIdentity, SkipDomain, StreamEntry};
pub use metadata::{MediaKind, MetadataRecord, Resolution};
