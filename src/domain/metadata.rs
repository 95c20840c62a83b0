//! Metadata records and resolution outcomes.

use serde::{Deserialize, Serialize};

/// Media kind tag carried by combined-search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
    #[serde(other)]
    Other,
}

/// A single search result from the metadata service.
///
/// Field aliases absorb the movie/TV naming split in TMDB responses
/// (`title` vs `name`, `release_date` vs `first_air_date`), so one shape
/// covers both endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// External (TMDB) id
    pub id: i64,

    /// Title for movies, name for TV results
    #[serde(alias = "name")]
    pub title: String,

    #[serde(default, alias = "original_name")]
    pub original_title: Option<String>,

    #[serde(default)]
    pub overview: Option<String>,

    #[serde(default)]
    pub vote_average: f64,

    #[serde(default)]
    pub vote_count: u64,

    #[serde(default)]
    pub popularity: f64,

    /// ISO 639-1 code of the original language
    #[serde(default)]
    pub original_language: Option<String>,

    /// Release date for movies, first air date for TV (`YYYY-MM-DD`)
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,

    #[serde(default)]
    pub media_type: Option<MediaKind>,

    #[serde(default)]
    pub poster_path: Option<String>,

    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl MetadataRecord {
    /// Year derived from the release/first-air date, if the date parses
    pub fn year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }

    /// True when the combined search tagged this result as a TV show
    pub fn is_tv(&self) -> bool {
        self.media_type == Some(MediaKind::Tv)
    }
}

/// Outcome of one metadata lookup.
///
/// Transport failures surface as `Unreachable`, never as `NotFound`. Only
/// `NotFound` may enter the persistent skip list, and only decided outcomes
/// (`Found`/`NotFound`) are memoized for the life of the process.
#[derive(Debug, Clone)]
pub enum Resolution {
    Found(MetadataRecord),
    NotFound,
    Unreachable,
}

impl Resolution {
    /// The record, when one was found
    pub fn record(&self) -> Option<&MetadataRecord> {
        match self {
            Self::Found(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tv_aliases_deserialize() {
        let json = r#"{
            "id": 42,
            "name": "Some Show",
            "original_name": "Some Show Original",
            "first_air_date": "2015-04-05",
            "vote_average": 8.1,
            "vote_count": 900,
            "popularity": 12.5,
            "original_language": "en",
            "media_type": "tv"
        }"#;

        let record: MetadataRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Some Show");
        assert_eq!(
            record.original_title.as_deref(),
            Some("Some Show Original")
        );
        assert_eq!(record.release_date.as_deref(), Some("2015-04-05"));
        assert!(record.is_tv());
        assert_eq!(record.year(), Some(2015));
    }

    #[test]
    fn test_movie_fields_deserialize() {
        let json = r#"{
            "id": 7,
            "title": "Some Movie",
            "release_date": "1999-10-15",
            "vote_average": 7.0,
            "vote_count": 100,
            "popularity": 3.0,
            "original_language": "en",
            "poster_path": "/abc.jpg"
        }"#;

        let record: MetadataRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Some Movie");
        assert_eq!(record.year(), Some(1999));
        assert!(!record.is_tv());
        assert_eq!(record.poster_path.as_deref(), Some("/abc.jpg"));
    }

    #[test]
    fn test_year_handles_malformed_dates() {
        let mut record: MetadataRecord =
            serde_json::from_str(r#"{"id": 1, "title": "x"}"#).unwrap();
        assert_eq!(record.year(), None);

        record.release_date = Some("".to_string());
        assert_eq!(record.year(), None);

        record.release_date = Some("19".to_string());
        assert_eq!(record.year(), None);

        record.release_date = Some("abcd-01-01".to_string());
        assert_eq!(record.year(), None);

        record.release_date = Some("2003-01-01".to_string());
        assert_eq!(record.year(), Some(2003));
    }

    #[test]
    fn test_unknown_media_kind_maps_to_other() {
        let json = r#"{"id": 1, "title": "x", "media_type": "person"}"#;
        let record: MetadataRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.media_type, Some(MediaKind::Other));
        assert!(!record.is_tv());
    }

    #[test]
    fn test_resolution_accessors() {
        let record: MetadataRecord =
            serde_json::from_str(r#"{"id": 1, "title": "x"}"#).unwrap();

        let found = Resolution::Found(record);
        assert!(found.record().is_some());
        assert!(!found.is_not_found());

        assert!(Resolution::NotFound.is_not_found());
        assert!(Resolution::Unreachable.is_unreachable());
        assert!(Resolution::NotFound.record().is_none());
    }
}
