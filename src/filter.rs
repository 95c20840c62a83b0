//! Acceptance thresholds for resolved metadata.
//!
//! Pure evaluation: the policy returns a verdict listing every failed
//! bound; recording the rejection in the skip list is the pipeline's job,
//! so all cache mutation stays on its single thread of control.

use thiserror::Error;

use crate::domain::MetadataRecord;

/// Minimum bars a record must clear before its entry is materialized.
///
/// Every lower bound is inclusive: a record sitting exactly on a minimum
/// is accepted.
#[derive(Debug, Clone)]
pub struct AcceptancePolicy {
    pub minimum_rating: f64,
    pub minimum_votes: u64,
    pub minimum_popularity: f64,
    pub minimum_year: i32,

    /// BCP 47 tag; only the primary subtag is compared
    pub target_language: String,
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            minimum_rating: 0.0,
            minimum_votes: 0,
            minimum_popularity: 0.0,
            minimum_year: 0,
            target_language: "en-US".to_string(),
        }
    }
}

/// A record that failed the acceptance bar, with each failed bound named
#[derive(Debug, Clone, Error)]
#[error("Below acceptance thresholds: {}", failures.join(", "))]
pub struct Rejection {
    pub failures: Vec<String>,
}

impl AcceptancePolicy {
    /// Evaluate a record against every configured bar.
    ///
    /// Collects all failures rather than stopping at the first, so the
    /// rejection log line names everything that was out of bounds.
    pub fn evaluate(&self, record: &MetadataRecord) -> Result<(), Rejection> {
        let mut failures = Vec::new();

        let target = primary_subtag(&self.target_language);
        let actual = record.original_language.as_deref().unwrap_or("");
        if !primary_subtag(actual).eq_ignore_ascii_case(target) {
            failures.push(format!("language {actual:?} != {target}"));
        }

        if record.vote_average < self.minimum_rating {
            failures.push(format!(
                "rating {}<{}",
                record.vote_average, self.minimum_rating
            ));
        }

        if record.vote_count < self.minimum_votes {
            failures.push(format!("votes {}<{}", record.vote_count, self.minimum_votes));
        }

        if record.popularity < self.minimum_popularity {
            failures.push(format!(
                "popularity {}<{}",
                record.popularity, self.minimum_popularity
            ));
        }

        // The year bound only applies when a year is derivable at all
        if let Some(year) = record.year() {
            if year < self.minimum_year {
                failures.push(format!("year {year}<{}", self.minimum_year));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Rejection { failures })
        }
    }
}

fn primary_subtag(language: &str) -> &str {
    language.split('-').next().unwrap_or(language)
}
