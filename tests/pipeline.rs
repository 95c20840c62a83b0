//! Catalog Pass Integration Tests
//!
//! Drives the whole pipeline against scripted collaborators: an in-memory
//! catalog, a canned metadata service, and a controllable liveness prober.
//! Artifacts land in one TempDir and the skip cache in another, so every
//! assertion is against real files.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use strmforge::assets::{AssetPool, AssetStore, SubtitleQuery};
use strmforge::config::Settings;
use strmforge::domain::{MetadataRecord, SkipDomain, StreamEntry};
use strmforge::errors::PipelineError;
use strmforge::library::{LibraryLayout, Materializer};
use strmforge::pipeline::Pipeline;
use strmforge::resolve::{MetadataResolver, MetadataService};
use strmforge::skiplist::SkipList;
use strmforge::source::{CatalogSource, LivenessProber};

/// In-memory catalog; groups are served in insertion order
struct FakeCatalog {
    groups: Vec<String>,
    entries: HashMap<String, Vec<StreamEntry>>,
    fail_group: Option<String>,
}

impl FakeCatalog {
    fn new() -> Self {
        Self {
            groups: Vec::new(),
            entries: HashMap::new(),
            fail_group: None,
        }
    }

    fn with_group(mut self, group: &str, names: &[&str]) -> Self {
        let offset = self.entries.len() as i64 * 100;
        let list = names
            .iter()
            .enumerate()
            .map(|(i, name)| StreamEntry {
                id: offset + i as i64,
                name: name.to_string(),
                group: group.to_string(),
                stream_hash: format!("hash-{}", offset + i as i64),
            })
            .collect();
        self.groups.push(group.to_string());
        self.entries.insert(group.to_string(), list);
        self
    }

    /// Add a group whose entry listing always fails
    fn with_failing_group(mut self, group: &str) -> Self {
        self.groups.push(group.to_string());
        self.fail_group = Some(group.to_string());
        self
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn groups(&self) -> Result<Vec<String>, PipelineError> {
        Ok(self.groups.clone())
    }

    async fn entries(&self, group: &str) -> Result<Vec<StreamEntry>, PipelineError> {
        if self.fail_group.as_deref() == Some(group) {
            return Err(PipelineError::NotFound(format!("group {group}")));
        }
        Ok(self.entries.get(group).cloned().unwrap_or_default())
    }

    fn playable_url(&self, entry: &StreamEntry) -> String {
        format!("http://origin.test/stream/{}", entry.stream_hash)
    }
}

/// Prober with a fixed verdict, counting every probe it answers
struct StaticProber {
    verdict: bool,
    probes: AtomicUsize,
}

impl StaticProber {
    fn alive() -> Arc<Self> {
        Arc::new(Self {
            verdict: true,
            probes: AtomicUsize::new(0),
        })
    }

    fn dead() -> Arc<Self> {
        Arc::new(Self {
            verdict: false,
            probes: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LivenessProber for StaticProber {
    async fn is_reachable(&self, _url: &str) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.verdict
    }
}

/// Metadata service answering from a canned query-title map.
///
/// The shared call counter survives the pipeline consuming the service,
/// so tests can assert on lookup traffic after a pass.
struct ScriptedService {
    records: HashMap<String, MetadataRecord>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedService {
    fn with_records(records: Vec<(&str, MetadataRecord)>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let map = records
            .into_iter()
            .map(|(query, record)| (query.to_string(), record))
            .collect();
        (
            Self {
                records: map,
                fail: false,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn unreachable() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                records: HashMap::new(),
                fail: true,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn lookup(&self, title: &str) -> Result<Vec<MetadataRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(self.records.get(title).cloned().into_iter().collect())
    }
}

#[async_trait]
impl MetadataService for ScriptedService {
    async fn search_movie(&self, title: &str, _year: Option<i32>) -> Result<Vec<MetadataRecord>> {
        self.lookup(title)
    }

    async fn search_multi(&self, title: &str) -> Result<Vec<MetadataRecord>> {
        self.lookup(title)
    }
}

/// Store for passes that must not fetch any asset
struct NullStore;

#[async_trait]
impl AssetStore for NullStore {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        anyhow::bail!("unexpected asset fetch: {url}")
    }

    async fn fetch_subtitle(&self, _query: &SubtitleQuery) -> Result<Option<String>> {
        anyhow::bail!("unexpected subtitle fetch")
    }
}

/// Store answering every fetch with fixed payloads
struct StaticStore;

#[async_trait]
impl AssetStore for StaticStore {
    async fn fetch_bytes(&self, _url: &str) -> Result<Vec<u8>> {
        Ok(b"artwork".to_vec())
    }

    async fn fetch_subtitle(&self, _query: &SubtitleQuery) -> Result<Option<String>> {
        Ok(Some("1\n00:00:01,000 --> 00:00:02,000\nHello\n".to_string()))
    }
}

fn movie_record(id: i64, title: &str, date: &str) -> MetadataRecord {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "overview": "Synopsis.",
        "original_language": "en",
        "vote_average": 7.9,
        "vote_count": 1500,
        "popularity": 42.0,
        "release_date": date,
    }))
    .unwrap()
}

fn show_record(id: i64, name: &str) -> MetadataRecord {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "media_type": "tv",
        "overview": "Synopsis.",
        "original_language": "en",
        "vote_average": 8.2,
        "vote_count": 900,
        "popularity": 30.0,
        "first_air_date": "2022-04-01",
    }))
    .unwrap()
}

async fn build_pass(
    settings: Settings,
    catalog: FakeCatalog,
    prober: Arc<StaticProber>,
    service: Option<ScriptedService>,
    store: Arc<dyn AssetStore>,
    library_root: &Path,
    skip_path: &Path,
) -> Pipeline {
    let materializer = Materializer::new(LibraryLayout::new(library_root), prober).with_sidecars(
        settings.write_sidecars,
        settings.write_sidecars_only_if_missing,
    );
    let skip_list = SkipList::load(skip_path).await;
    let assets = AssetPool::start(store, 2, 16);

    let mut pass = Pipeline::new(
        settings,
        Arc::new(catalog),
        materializer,
        skip_list,
        skip_path.to_path_buf(),
        assets,
    );
    if let Some(service) = service {
        pass = pass.with_resolver(MetadataResolver::new(Box::new(service)));
    }
    pass
}

#[tokio::test]
async fn test_full_pass_materializes_all_three_kinds() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let catalog = FakeCatalog::new()
        .with_group("Movies", &["Blade Runner (1982)"])
        .with_group("TV", &["Slow Horses S01E02"])
        .with_group("24/7 Channels", &["24/7 Alien"]);
    let (service, calls) = ScriptedService::with_records(vec![
        ("Blade Runner", movie_record(78, "Blade Runner", "1982-06-25")),
        ("Slow Horses", show_record(95480, "Slow Horses")),
        ("Alien", movie_record(348, "Alien", "1979-05-25")),
    ]);

    let pass = build_pass(
        Settings::default(),
        catalog,
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = pass.run().await.unwrap();

    assert_eq!(summary.groups_processed, 3);
    assert_eq!(summary.entries_seen, 3);
    assert_eq!(summary.created, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // The reference file body is exactly the playable URL
    let movie_ref = library
        .path()
        .join("Movies/Blade Runner (1982)/Blade Runner (1982).strm");
    let body = std::fs::read_to_string(&movie_ref).unwrap();
    assert_eq!(body, "http://origin.test/stream/hash-0");

    let nfo = std::fs::read_to_string(movie_ref.with_extension("nfo")).unwrap();
    assert!(nfo.contains("<title>Blade Runner</title>"));
    assert!(nfo.contains("<year>1982</year>"));
    assert!(nfo.contains("<tmdbid>78</tmdbid>"));

    // Episodes get a per-episode sidecar plus one at the show root
    let episode_dir = library
        .path()
        .join("TV Shows/Slow Horses/Season 01/Slow Horses - S01E02");
    assert!(episode_dir.join("Slow Horses - S01E02.strm").exists());
    let episode_nfo =
        std::fs::read_to_string(episode_dir.join("Slow Horses - S01E02.nfo")).unwrap();
    assert!(episode_nfo.contains("<season>1</season>"));
    assert!(episode_nfo.contains("<episode>2</episode>"));
    let show_nfo = std::fs::read_to_string(
        library.path().join("TV Shows/Slow Horses/Slow Horses.nfo"),
    )
    .unwrap();
    assert!(show_nfo.contains("<tvshow>"));

    // Continuous channels live under the 24-7 tree with a movie-shaped sidecar
    let channel_dir = library.path().join("24-7/Alien");
    assert!(channel_dir.join("Alien.strm").exists());
    assert!(channel_dir.join("Alien.nfo").exists());

    // The skip cache is persisted even when nothing was rejected
    assert!(skip_path.exists());
}

#[tokio::test]
async fn test_second_pass_reuses_artifacts_without_probing() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let catalog = || FakeCatalog::new().with_group("Movies", &["Blade Runner (1982)"]);
    let records = || vec![("Blade Runner", movie_record(78, "Blade Runner", "1982-06-25"))];

    let (service, _) = ScriptedService::with_records(records());
    let first_prober = StaticProber::alive();
    let first = build_pass(
        Settings::default(),
        catalog(),
        first_prober.clone(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = first.run().await.unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(first_prober.probes.load(Ordering::SeqCst), 1);

    let (service, _) = ScriptedService::with_records(records());
    let second_prober = StaticProber::alive();
    let second = build_pass(
        Settings::default(),
        catalog(),
        second_prober.clone(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = second.run().await.unwrap();

    assert_eq!(summary.created, 0);
    assert_eq!(summary.reused, 1);
    // An existing reference short-circuits before any liveness probe
    assert_eq!(second_prober.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_identity_costs_no_lookups_on_later_passes() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let mut settings = Settings::default();
    settings.minimum_votes = 1000;

    let catalog = || FakeCatalog::new().with_group("Movies", &["Obscure Film (2001)"]);
    let weak = || {
        let mut record = movie_record(9, "Obscure Film", "2001-01-01");
        record.vote_count = 3;
        vec![("Obscure Film", record)]
    };

    let (service, calls) = ScriptedService::with_records(weak());
    let first = build_pass(
        settings.clone(),
        catalog(),
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = first.run().await.unwrap();

    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.created, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!library.path().join("Movies").exists());

    let saved = SkipList::load(&skip_path).await;
    assert!(saved.contains(SkipDomain::Movies, "Obscure Film"));

    // The second pass drops the identity before ever reaching the resolver
    let (service, calls) = ScriptedService::with_records(weak());
    let second = build_pass(
        settings,
        catalog(),
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = second.run().await.unwrap();

    assert_eq!(summary.skip_listed, 1);
    assert_eq!(summary.rejected, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unmatched_entry_is_skip_listed_by_default() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let catalog = FakeCatalog::new().with_group("Movies", &["Nowhere Film (2010)"]);
    let (service, _) = ScriptedService::with_records(vec![]);

    let pass = build_pass(
        Settings::default(),
        catalog,
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = pass.run().await.unwrap();

    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.created, 0);
    assert!(!library.path().join("Movies").exists());

    let saved = SkipList::load(&skip_path).await;
    assert!(saved.contains(SkipDomain::Movies, "Nowhere Film"));
}

#[tokio::test]
async fn test_unmatched_flag_materializes_bare_reference() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let mut settings = Settings::default();
    settings.create_artifacts_for_unmatched = true;

    let catalog = FakeCatalog::new().with_group("Movies", &["Nowhere Film (2010)"]);
    let (service, _) = ScriptedService::with_records(vec![]);

    let pass = build_pass(
        settings,
        catalog,
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = pass.run().await.unwrap();

    assert_eq!(summary.created, 1);
    let reference = library
        .path()
        .join("Movies/Nowhere Film (2010)/Nowhere Film (2010).strm");
    assert!(reference.exists());
    // No metadata, no sidecar
    assert!(!reference.with_extension("nfo").exists());

    // The artifact itself is the durable marker; the identity stays off
    // the skip list so a keyed rerun reuses the file instead
    let saved = SkipList::load(&skip_path).await;
    assert!(!saved.contains(SkipDomain::Movies, "Nowhere Film"));
}

#[tokio::test]
async fn test_unreachable_service_defers_and_later_pass_retries() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let catalog = || FakeCatalog::new().with_group("Movies", &["Blade Runner (1982)"]);

    let (service, calls) = ScriptedService::unreachable();
    let first = build_pass(
        Settings::default(),
        catalog(),
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = first.run().await.unwrap();

    assert_eq!(summary.deferred, 1);
    assert_eq!(summary.created, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!library.path().join("Movies").exists());
    assert!(SkipList::load(&skip_path).await.is_empty());

    // Service recovered: the same identity resolves and materializes
    let (service, calls) = ScriptedService::with_records(vec![(
        "Blade Runner",
        movie_record(78, "Blade Runner", "1982-06-25"),
    )]);
    let second = build_pass(
        Settings::default(),
        catalog(),
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = second.run().await.unwrap();

    assert_eq!(summary.created, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dead_source_writes_no_artifacts() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let catalog = FakeCatalog::new().with_group("Movies", &["Blade Runner (1982)"]);
    let (service, _) = ScriptedService::with_records(vec![(
        "Blade Runner",
        movie_record(78, "Blade Runner", "1982-06-25"),
    )]);

    let pass = build_pass(
        Settings::default(),
        catalog,
        StaticProber::dead(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = pass.run().await.unwrap();

    assert_eq!(summary.unreachable, 1);
    assert_eq!(summary.created, 0);
    // Neither the reference nor any sidecar or directory appears
    assert!(!library.path().join("Movies").exists());
    // A dead source is not a rejection; nothing lands on the skip list
    assert!(SkipList::load(&skip_path).await.is_empty());
}

#[tokio::test]
async fn test_without_resolver_the_unmatched_flag_decides() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let catalog = || FakeCatalog::new().with_group("Movies", &["Blade Runner (1982)"]);

    // Flag off: the entry is dropped, but never skip-listed, because no
    // lookup was actually performed
    let first = build_pass(
        Settings::default(),
        catalog(),
        StaticProber::alive(),
        None,
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = first.run().await.unwrap();
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.created, 0);
    assert!(SkipList::load(&skip_path).await.is_empty());

    // Flag on: a bare reference appears without any metadata service
    let mut settings = Settings::default();
    settings.create_artifacts_for_unmatched = true;
    let second = build_pass(
        settings,
        catalog(),
        StaticProber::alive(),
        None,
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = second.run().await.unwrap();

    assert_eq!(summary.created, 1);
    let reference = library
        .path()
        .join("Movies/Blade Runner (1982)/Blade Runner (1982).strm");
    assert!(reference.exists());
    assert!(!reference.with_extension("nfo").exists());
}

#[tokio::test]
async fn test_failing_group_does_not_stop_the_pass() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let catalog = FakeCatalog::new()
        .with_failing_group("Broken")
        .with_group("Movies", &["Blade Runner (1982)"]);
    let (service, _) = ScriptedService::with_records(vec![(
        "Blade Runner",
        movie_record(78, "Blade Runner", "1982-06-25"),
    )]);

    let pass = build_pass(
        Settings::default(),
        catalog,
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = pass.run().await.unwrap();

    assert_eq!(summary.groups_processed, 1);
    assert_eq!(summary.created, 1);
}

#[tokio::test]
async fn test_assets_land_next_to_their_artifacts() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let mut settings = Settings::default();
    settings.tmdb_api_key = Some("key".to_string());
    settings.download_subtitles = true;
    settings.opensubtitles_api_key = Some("key".to_string());
    settings.opensubtitles_username = Some("user".to_string());
    settings.opensubtitles_password = Some("pass".to_string());

    let mut movie = movie_record(78, "Blade Runner", "1982-06-25");
    movie.poster_path = Some("/poster78.jpg".to_string());
    movie.backdrop_path = Some("/backdrop78.jpg".to_string());
    let mut show = show_record(95480, "Slow Horses");
    show.poster_path = Some("/poster95480.jpg".to_string());

    let catalog = FakeCatalog::new()
        .with_group("Movies", &["Blade Runner (1982)"])
        .with_group("TV", &["Slow Horses S01E02"]);
    let (service, _) =
        ScriptedService::with_records(vec![("Blade Runner", movie), ("Slow Horses", show)]);

    let pass = build_pass(
        settings,
        catalog,
        StaticProber::alive(),
        Some(service),
        Arc::new(StaticStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = pass.run().await.unwrap();
    assert_eq!(summary.created, 2);

    // Movie artwork and subtitle sit in the movie directory
    let movie_dir = library.path().join("Movies/Blade Runner (1982)");
    assert_eq!(
        std::fs::read(movie_dir.join("poster.jpg")).unwrap(),
        b"artwork".to_vec()
    );
    assert!(movie_dir.join("fanart.jpg").exists());
    assert!(movie_dir.join("Blade Runner (1982).en.srt").exists());

    // Episode artwork is shared at the show root, not the episode directory
    let show_root = library.path().join("TV Shows/Slow Horses");
    assert!(show_root.join("poster.jpg").exists());
    assert!(!show_root
        .join("Season 01/Slow Horses - S01E02/poster.jpg")
        .exists());
    assert!(show_root
        .join("Season 01/Slow Horses - S01E02/Slow Horses - S01E02.en.srt")
        .exists());
}

#[tokio::test]
async fn test_failed_asset_fetches_leave_entry_outcomes_untouched() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let skip_path = state.path().join("skip_cache.json");

    let mut settings = Settings::default();
    settings.tmdb_api_key = Some("key".to_string());

    let mut movie = movie_record(78, "Blade Runner", "1982-06-25");
    movie.poster_path = Some("/poster78.jpg".to_string());

    let catalog = FakeCatalog::new().with_group("Movies", &["Blade Runner (1982)"]);
    let (service, _) = ScriptedService::with_records(vec![("Blade Runner", movie)]);

    // Every fetch fails, yet the entry stays created and the reference stands
    let pass = build_pass(
        settings,
        catalog,
        StaticProber::alive(),
        Some(service),
        Arc::new(NullStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = pass.run().await.unwrap();

    assert_eq!(summary.created, 1);
    assert_eq!(summary.failed, 0);
    let movie_dir = library.path().join("Movies/Blade Runner (1982)");
    assert!(movie_dir.join("Blade Runner (1982).strm").exists());
    assert!(!movie_dir.join("poster.jpg").exists());
}

#[tokio::test]
async fn test_failed_skip_cache_save_leaves_the_summary_intact() {
    let library = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    // A file where the cache directory should go makes every save fail
    let blocker = state.path().join("occupied");
    std::fs::write(&blocker, "not a directory").unwrap();
    let skip_path = blocker.join("skip_cache.json");

    let mut settings = Settings::default();
    settings.tmdb_api_key = Some("key".to_string());

    let mut movie = movie_record(78, "Blade Runner", "1982-06-25");
    movie.poster_path = Some("/poster78.jpg".to_string());

    let catalog = FakeCatalog::new().with_group("Movies", &["Blade Runner (1982)"]);
    let (service, _) = ScriptedService::with_records(vec![("Blade Runner", movie)]);

    let pass = build_pass(
        settings,
        catalog,
        StaticProber::alive(),
        Some(service),
        Arc::new(StaticStore),
        library.path(),
        &skip_path,
    )
    .await;
    let summary = pass.run().await.unwrap();

    // The pass still reports what it did, and the artifacts stand
    assert_eq!(summary.created, 1);
    let movie_dir = library.path().join("Movies/Blade Runner (1982)");
    assert!(movie_dir.join("Blade Runner (1982).strm").exists());
    // Queued fetches were drained after the failed save, not abandoned
    assert!(movie_dir.join("poster.jpg").exists());
}
