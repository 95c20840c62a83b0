//! Sidecar XML rendering.
//!
//! One document shape per content kind, populated from a `MetadataRecord`.
//! Missing fields render as empty elements instead of failing the write,
//! so a thin search result still produces a usable sidecar.

use crate::domain::MetadataRecord;

/// Escape the five XML-reserved characters
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn text(value: Option<&str>) -> String {
    escape(value.unwrap_or_default())
}

fn year_text(record: &MetadataRecord) -> String {
    record.year().map(|year| year.to_string()).unwrap_or_default()
}

/// Render a movie sidecar (also used for continuous channels)
pub fn movie(record: &MetadataRecord) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <movie>\n\
         \x20 <title>{title}</title>\n\
         \x20 <originaltitle>{original}</originaltitle>\n\
         \x20 <sorttitle>{title}</sorttitle>\n\
         \x20 <year>{year}</year>\n\
         \x20 <releasedate>{released}</releasedate>\n\
         \x20 <plot>{plot}</plot>\n\
         \x20 <rating>{rating}</rating>\n\
         \x20 <votes>{votes}</votes>\n\
         \x20 <tmdbid>{id}</tmdbid>\n\
         </movie>\n",
        title = escape(&record.title),
        original = text(record.original_title.as_deref()),
        year = year_text(record),
        released = text(record.release_date.as_deref()),
        plot = text(record.overview.as_deref()),
        rating = record.vote_average,
        votes = record.vote_count,
        id = record.id,
    )
}

/// Render a show-level sidecar
pub fn show(record: &MetadataRecord) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <tvshow>\n\
         \x20 <title>{title}</title>\n\
         \x20 <originaltitle>{original}</originaltitle>\n\
         \x20 <plot>{plot}</plot>\n\
         \x20 <tmdbid>{id}</tmdbid>\n\
         \x20 <year>{year}</year>\n\
         \x20 <premiered>{premiered}</premiered>\n\
         \x20 <rating>{rating}</rating>\n\
         \x20 <votes>{votes}</votes>\n\
         </tvshow>\n",
        title = escape(&record.title),
        original = text(record.original_title.as_deref()),
        plot = text(record.overview.as_deref()),
        id = record.id,
        year = year_text(record),
        premiered = text(record.release_date.as_deref()),
        rating = record.vote_average,
        votes = record.vote_count,
    )
}

/// Render an episode sidecar from the show record plus episode numbers.
///
/// The air date needs a per-episode detail lookup the resolver does not
/// make, so `aired` renders empty.
pub fn episode(record: &MetadataRecord, season: u8, episode: u8) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <episodedetails>\n\
         \x20 <title>{title}</title>\n\
         \x20 <season>{season}</season>\n\
         \x20 <episode>{episode}</episode>\n\
         \x20 <plot>{plot}</plot>\n\
         \x20 <aired></aired>\n\
         \x20 <rating>{rating}</rating>\n\
         \x20 <votes>{votes}</votes>\n\
         \x20 <tmdbid>{id}</tmdbid>\n\
         </episodedetails>\n",
        title = escape(&record.title),
        season = season,
        episode = episode,
        plot = text(record.overview.as_deref()),
        rating = record.vote_average,
        votes = record.vote_count,
        id = record.id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> MetadataRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_movie_renders_every_field() {
        let record = record(
            r#"{
                "id": 603,
                "title": "The Matrix",
                "original_title": "The Matrix",
                "overview": "A hacker learns the truth.",
                "release_date": "1999-03-30",
                "vote_average": 8.2,
                "vote_count": 24000
            }"#,
        );

        let xml = movie(&record);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<movie>"));
        assert!(xml.contains("  <title>The Matrix</title>"));
        assert!(xml.contains("  <year>1999</year>"));
        assert!(xml.contains("  <releasedate>1999-03-30</releasedate>"));
        assert!(xml.contains("  <rating>8.2</rating>"));
        assert!(xml.contains("  <votes>24000</votes>"));
        assert!(xml.contains("  <tmdbid>603</tmdbid>"));
        assert!(xml.trim_end().ends_with("</movie>"));
    }

    #[test]
    fn test_missing_fields_render_empty_elements() {
        let record = record(r#"{"id": 1, "title": "Bare"}"#);

        let xml = movie(&record);
        assert!(xml.contains("<originaltitle></originaltitle>"));
        assert!(xml.contains("<year></year>"));
        assert!(xml.contains("<plot></plot>"));
        assert!(xml.contains("<rating>0</rating>"));
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        let record = record(r#"{"id": 1, "title": "Tom & Jerry <Live>"}"#);

        let xml = movie(&record);
        assert!(xml.contains("<title>Tom &amp; Jerry &lt;Live&gt;</title>"));
        assert!(!xml.contains("Tom & Jerry"));
    }

    #[test]
    fn test_show_uses_first_air_date_fields() {
        let record = record(
            r#"{
                "id": 42,
                "name": "Some Show",
                "first_air_date": "2015-04-05",
                "vote_average": 7.5,
                "vote_count": 300
            }"#,
        );

        let xml = show(&record);
        assert!(xml.contains("<tvshow>"));
        assert!(xml.contains("  <premiered>2015-04-05</premiered>"));
        assert!(xml.contains("  <year>2015</year>"));
    }

    #[test]
    fn test_episode_carries_unpadded_numbers() {
        let record = record(r#"{"id": 42, "name": "Some Show", "overview": "Pilot."}"#);

        let xml = episode(&record, 2, 5);
        assert!(xml.contains("<episodedetails>"));
        assert!(xml.contains("  <season>2</season>"));
        assert!(xml.contains("  <episode>5</episode>"));
        assert!(xml.contains("  <plot>Pilot.</plot>"));
    }
}
