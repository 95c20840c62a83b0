//! On-disk media library: path layout, sidecar rendering, and the writer
//! that materializes reference files.
//!
//! # Layout
//!
//! ```text
//! <destination_root>/
//! ├── 24-7/
//! │   └── <Title>/
//! │       ├── <Title>.strm
//! │       └── <Title>.nfo
//! ├── Movies/
//! │   └── <Title (Year)>/
//! │       ├── <Title (Year)>.strm
//! │       ├── <Title (Year)>.nfo
//! │       └── poster.jpg
//! └── TV Shows/
//!     └── <Show>/
//!         ├── <Show>.nfo
//!         ├── poster.jpg
//!         └── Season 02/
//!             └── <Show - S02E05>/
//!                 ├── <Show - S02E05>.strm
//!                 └── <Show - S02E05>.nfo
//! ```

pub mod layout;
pub mod sidecar;
pub mod writer;

pub use layout::LibraryLayout;
pub use writer::{ArtifactOutcome, Materializer};
