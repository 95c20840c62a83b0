//! Destination path computation for classified entries.
//!
//! Every path is derived from the destination root, a content-kind
//! subdirectory, and sanitized titles, so two runs over the same catalog
//! land on identical paths.

use std::path::{Path, PathBuf};

use crate::classify::sanitize;
use crate::domain::ClassifiedIdentity;

const CONTINUOUS_DIR: &str = "24-7";
const MOVIES_DIR: &str = "Movies";
const SHOWS_DIR: &str = "TV Shows";

/// Poster artwork filename, stored next to the reference file
pub const POSTER_FILE: &str = "poster.jpg";
/// Backdrop artwork filename, stored next to the reference file
pub const BACKDROP_FILE: &str = "fanart.jpg";

/// Computes artifact paths under a fixed destination root
#[derive(Debug, Clone)]
pub struct LibraryLayout {
    root: PathBuf,
}

/// Resolved destination paths for one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
    /// Directory holding the entry's artifacts
    pub directory: PathBuf,
    /// The `.strm` reference file
    pub reference: PathBuf,
    /// The `.nfo` sidecar next to the reference file
    pub sidecar: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Artifact paths for a classified identity
    pub fn target(&self, identity: &ClassifiedIdentity) -> TargetPaths {
        match identity {
            ClassifiedIdentity::Continuous { title } => {
                let stem = sanitize(title);
                TargetPaths::new(self.root.join(CONTINUOUS_DIR).join(&stem), &stem)
            }
            ClassifiedIdentity::Feature { title, year } => {
                let stem = match year {
                    Some(year) => sanitize(&format!("{title} ({year})")),
                    None => sanitize(title),
                };
                TargetPaths::new(self.root.join(MOVIES_DIR).join(&stem), &stem)
            }
            ClassifiedIdentity::Episode {
                show,
                season,
                episode,
            } => {
                let show = sanitize(show);
                let stem = format!("{show} - S{season:02}E{episode:02}");
                let directory = self
                    .root
                    .join(SHOWS_DIR)
                    .join(&show)
                    .join(format!("Season {season:02}"))
                    .join(&stem);
                TargetPaths::new(directory, &stem)
            }
        }
    }

    /// Top-level directory for a show
    pub fn show_root(&self, show: &str) -> PathBuf {
        self.root.join(SHOWS_DIR).join(sanitize(show))
    }

    /// Show-level sidecar, shared by every episode of the show
    pub fn show_sidecar(&self, show: &str) -> PathBuf {
        let show = sanitize(show);
        self.root.join(SHOWS_DIR).join(&show).join(format!("{show}.nfo"))
    }
}

impl TargetPaths {
    fn new(directory: PathBuf, stem: &str) -> Self {
        let reference = directory.join(format!("{stem}.strm"));
        let sidecar = directory.join(format!("{stem}.nfo"));
        Self {
            directory,
            reference,
            sidecar,
        }
    }

    /// Subtitle path for a language code, e.g. `Title.en.srt`
    pub fn subtitle(&self, language: &str) -> PathBuf {
        let stem = self
            .reference
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        self.directory.join(format!("{stem}.{language}.srt"))
    }

    /// Poster artwork path next to the reference file
    pub fn poster(&self) -> PathBuf {
        self.directory.join(POSTER_FILE)
    }

    /// Backdrop artwork path next to the reference file
    pub fn backdrop(&self) -> PathBuf {
        self.directory.join(BACKDROP_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> LibraryLayout {
        LibraryLayout::new("/media")
    }

    #[test]
    fn test_continuous_target_nests_under_24_7() {
        let target = layout().target(&ClassifiedIdentity::Continuous {
            title: "News Channel".to_string(),
        });
        assert_eq!(target.directory, PathBuf::from("/media/24-7/News Channel"));
        assert_eq!(
            target.reference,
            PathBuf::from("/media/24-7/News Channel/News Channel.strm")
        );
        assert_eq!(
            target.sidecar,
            PathBuf::from("/media/24-7/News Channel/News Channel.nfo")
        );
    }

    #[test]
    fn test_feature_target_includes_year_when_known() {
        let target = layout().target(&ClassifiedIdentity::Feature {
            title: "Movie Title".to_string(),
            year: Some(1999),
        });
        assert_eq!(
            target.reference,
            PathBuf::from("/media/Movies/Movie Title (1999)/Movie Title (1999).strm")
        );
    }

    #[test]
    fn test_feature_target_without_year_uses_bare_title() {
        let target = layout().target(&ClassifiedIdentity::Feature {
            title: "Movie Title".to_string(),
            year: None,
        });
        assert_eq!(
            target.directory,
            PathBuf::from("/media/Movies/Movie Title")
        );
    }

    #[test]
    fn test_episode_target_is_zero_padded() {
        let target = layout().target(&ClassifiedIdentity::Episode {
            show: "Show Name".to_string(),
            season: 2,
            episode: 5,
        });
        assert_eq!(
            target.reference,
            PathBuf::from(
                "/media/TV Shows/Show Name/Season 02/Show Name - S02E05/Show Name - S02E05.strm"
            )
        );
    }

    #[test]
    fn test_show_sidecar_sits_at_show_root() {
        assert_eq!(
            layout().show_sidecar("Show Name"),
            PathBuf::from("/media/TV Shows/Show Name/Show Name.nfo")
        );
    }

    #[test]
    fn test_illegal_characters_are_sanitized_out_of_paths() {
        let target = layout().target(&ClassifiedIdentity::Feature {
            title: "Title: Sub/Title".to_string(),
            year: None,
        });
        assert_eq!(target.directory, PathBuf::from("/media/Movies/Title Sub Title"));
    }

    #[test]
    fn test_subtitle_path_shares_the_reference_stem() {
        let target = layout().target(&ClassifiedIdentity::Continuous {
            title: "News Channel".to_string(),
        });
        assert_eq!(
            target.subtitle("en"),
            PathBuf::from("/media/24-7/News Channel/News Channel.en.srt")
        );
    }

    #[test]
    fn test_artwork_paths_live_in_the_target_directory() {
        let target = layout().target(&ClassifiedIdentity::Feature {
            title: "Movie Title".to_string(),
            year: Some(1999),
        });
        assert_eq!(
            target.poster(),
            PathBuf::from("/media/Movies/Movie Title (1999)/poster.jpg")
        );
        assert_eq!(
            target.backdrop(),
            PathBuf::from("/media/Movies/Movie Title (1999)/fanart.jpg")
        );
    }
}
