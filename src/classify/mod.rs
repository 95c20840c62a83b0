//! Name classification: decide what kind of content a raw entry is.
//!
//! Pure string work, no I/O. The classifier looks at an entry name plus the
//! group label it was listed under and produces a [`ClassifiedIdentity`]:
//! continuous channel, episode, or feature. The sanitized title it returns
//! is the identity key everything downstream caches on.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ClassifiedIdentity;

/// `24/7` or `24-7`, plus the separator run that usually trails it
static CONTINUOUS_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b24[/-]7\b[\s\-:]*").expect("continuous marker regex should compile")
});

/// `<show> S01E02`, season/episode limited to two digits
static EPISODE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)[\s\-]+[Ss](\d{1,2})[Ee](\d{1,2})").expect("episode tag regex should compile")
});

/// `<title> (1999)` anchored at the start of the name
static FEATURE_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s*\((\d{4})\)").expect("feature year regex should compile")
});

static ILLEGAL_PATH_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[<>:"/\\|?*]"#).expect("illegal path chars regex should compile")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Replace characters illegal in filesystem paths with spaces, collapse
/// whitespace runs, and trim
pub fn sanitize(name: &str) -> String {
    let cleaned = ILLEGAL_PATH_CHARS.replace_all(name, " ");
    WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string()
}

/// Remove every configured verbatim substring, then sanitize
pub fn clean_name(name: &str, strings_to_remove: &[String]) -> String {
    let mut name = name.to_string();
    for needle in strings_to_remove {
        if !needle.is_empty() {
            name = name.replace(needle.as_str(), "");
        }
    }
    sanitize(&name)
}

/// Classify a raw entry name given the group label it was listed under.
///
/// Precedence: continuous marker (in the group or the name itself), then
/// episode tag, then title-with-year, then the residual feature case.
/// Deterministic for any input.
pub fn classify(name: &str, group: &str, strings_to_remove: &[String]) -> ClassifiedIdentity {
    if CONTINUOUS_MARKER.is_match(group) || CONTINUOUS_MARKER.is_match(name) {
        let stripped = CONTINUOUS_MARKER.replace_all(name, "");
        let title = clean_name(&stripped, strings_to_remove);
        if !title.is_empty() {
            return ClassifiedIdentity::Continuous { title };
        }
    }

    if let Some(caps) = EPISODE_TAG.captures(name) {
        let show = clean_name(&caps[1], strings_to_remove);
        if !show.is_empty() {
            return ClassifiedIdentity::Episode {
                show,
                season: caps[2].parse().unwrap_or(0),
                episode: caps[3].parse().unwrap_or(0),
            };
        }
    }

    if let Some(caps) = FEATURE_YEAR.captures(name) {
        let title = clean_name(&caps[1], strings_to_remove);
        if !title.is_empty() {
            return ClassifiedIdentity::Feature {
                title,
                year: caps[2].parse().ok(),
            };
        }
    }

    ClassifiedIdentity::Feature {
        title: clean_name(name, strings_to_remove),
        year: None,
    }
}
