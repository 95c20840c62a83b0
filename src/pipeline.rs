//! The sequential catalog pass: classify, skip-check, resolve, filter,
//! materialize, and hand auxiliary assets to the background pool.
//!
//! The pass is single-threaded per entry on purpose. Skip-list and
//! resolution-cache writes happen from one thread of control, so cache
//! state is deterministic without locking. Every per-entry failure is
//! caught at the entry boundary and the loop moves on.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use glob::Pattern;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assets::{AssetJob, AssetPool, SubtitleQuery};
use crate::classify::classify;
use crate::config::Settings;
use crate::domain::{ClassifiedIdentity, MetadataRecord, Resolution, StreamEntry};
use crate::errors::PipelineError;
use crate::filter::AcceptancePolicy;
use crate::library::layout::{TargetPaths, BACKDROP_FILE, POSTER_FILE};
use crate::library::{ArtifactOutcome, Materializer};
use crate::resolve::{tmdb, MetadataResolver};
use crate::skiplist::SkipList;
use crate::source::CatalogSource;

/// Counters for one complete pass over the catalog
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Groups fully iterated (selected groups whose fetch succeeded)
    pub groups_processed: usize,
    pub entries_seen: usize,
    /// Reference files newly written
    pub created: usize,
    /// Reference files that already existed
    pub reused: usize,
    /// Entries whose source failed the liveness probe
    pub unreachable: usize,
    /// Entries short-circuited by the persistent skip list
    pub skip_listed: usize,
    /// Entries rejected by thresholds or by a definitive no-match
    pub rejected: usize,
    /// Entries deferred because the metadata service was unreachable
    pub deferred: usize,
    /// Entries that failed with a per-entry error
    pub failed: usize,
}

impl RunSummary {
    fn new(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: started_at,
            groups_processed: 0,
            entries_seen: 0,
            created: 0,
            reused: 0,
            unreachable: 0,
            skip_listed: 0,
            rejected: 0,
            deferred: 0,
            failed: 0,
        }
    }
}

/// One catalog pass with all collaborators injected.
///
/// The skip list is owned state here, not a global: tests drive the
/// pipeline with scripted collaborators and observe cache behavior
/// deterministically.
pub struct Pipeline {
    settings: Settings,
    policy: AcceptancePolicy,
    source: Arc<dyn CatalogSource>,
    resolver: Option<MetadataResolver>,
    materializer: Materializer,
    skip_list: SkipList,
    skip_list_path: PathBuf,
    assets: AssetPool,
}

impl Pipeline {
    pub fn new(
        settings: Settings,
        source: Arc<dyn CatalogSource>,
        materializer: Materializer,
        skip_list: SkipList,
        skip_list_path: PathBuf,
        assets: AssetPool,
    ) -> Self {
        let policy = settings.acceptance_policy();
        Self {
            settings,
            policy,
            source,
            resolver: None,
            materializer,
            skip_list,
            skip_list_path,
            assets,
        }
    }

    /// Attach a metadata resolver; without one, entries resolve to nothing
    /// and only the unmatched pathway can materialize them
    pub fn with_resolver(mut self, resolver: MetadataResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run one complete pass over the selected groups
    pub async fn run(mut self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let mut summary = RunSummary::new(run_id, Utc::now());
        info!(%run_id, "Starting catalog pass");

        let groups = self
            .source
            .groups()
            .await
            .context("Failed to list catalog groups")?;
        let selected = select_groups(&groups, &self.settings.group_patterns);
        info!(
            available = groups.len(),
            selected = selected.len(),
            "Selected catalog groups"
        );

        for group in &selected {
            match self.process_group(group, &mut summary).await {
                Ok(()) => summary.groups_processed += 1,
                Err(error) => {
                    warn!(group, %error, "Group pass failed, moving to next group");
                }
            }
        }

        // A lost skip list only costs repeat lookups next pass; the
        // artifacts already written this pass stand either way.
        if let Err(error) = self.skip_list.save(&self.skip_list_path).await {
            warn!(
                path = %self.skip_list_path.display(),
                %error,
                "Failed to persist the skip list, rejections will be re-evaluated next pass"
            );
        }

        // Let queued artwork/subtitle fetches finish before reporting.
        self.assets.drain().await;

        summary.finished_at = Utc::now();
        info!(
            %run_id,
            groups = summary.groups_processed,
            entries = summary.entries_seen,
            created = summary.created,
            reused = summary.reused,
            rejected = summary.rejected,
            skip_listed = summary.skip_listed,
            unreachable = summary.unreachable,
            deferred = summary.deferred,
            failed = summary.failed,
            "Catalog pass complete"
        );
        Ok(summary)
    }

    async fn process_group(
        &mut self,
        group: &str,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        info!(group, "Processing group");
        let entries = self.source.entries(group).await?;
        for entry in entries {
            summary.entries_seen += 1;
            if let Err(error) = self.process_entry(&entry, summary).await {
                summary.failed += 1;
                warn!(entry = %entry.name, group, %error, "Entry failed, continuing");
            }
        }
        Ok(())
    }

    async fn process_entry(
        &mut self,
        entry: &StreamEntry,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let identity = classify(&entry.name, &entry.group, &self.settings.strings_to_remove);
        if identity.key().is_empty() {
            warn!(entry = %entry.name, "Name sanitizes to nothing, dropping entry");
            return Ok(());
        }

        // The skip list is consulted before any resolution so a listed
        // identity costs no network calls at all.
        if self.skip_list.contains(identity.skip_domain(), identity.key()) {
            debug!(key = identity.key(), "Identity is skip-listed, short-circuiting");
            summary.skip_listed += 1;
            return Ok(());
        }

        let resolution = self.resolve(&identity, &entry.group).await;
        let record = match resolution {
            Some(Resolution::Found(record)) => {
                if let Err(rejection) = self.policy.evaluate(&record) {
                    info!(key = identity.key(), %rejection, "Rejected");
                    self.skip_list.insert(identity.skip_domain(), identity.key());
                    summary.rejected += 1;
                    return Ok(());
                }
                Some(record)
            }
            Some(Resolution::NotFound) => {
                if !self.settings.create_artifacts_for_unmatched {
                    info!(key = identity.key(), "No metadata match, skip-listing");
                    self.skip_list.insert(identity.skip_domain(), identity.key());
                    summary.rejected += 1;
                    return Ok(());
                }
                None
            }
            Some(Resolution::Unreachable) => {
                // Not listed and not materialized: a later run retries.
                warn!(key = identity.key(), "Metadata service unreachable, deferring entry");
                summary.deferred += 1;
                return Ok(());
            }
            // No resolver configured; the unmatched pathway decides.
            None => {
                if !self.settings.create_artifacts_for_unmatched {
                    debug!(key = identity.key(), "No resolver and unmatched artifacts disabled");
                    summary.rejected += 1;
                    return Ok(());
                }
                None
            }
        };

        let target = self.materializer.target(&identity);
        let source_url = self.source.playable_url(entry);
        let outcome = self
            .materializer
            .materialize(&identity, &target, record.as_ref(), &source_url)
            .await?;

        match outcome {
            ArtifactOutcome::Created => summary.created += 1,
            ArtifactOutcome::AlreadyExists => summary.reused += 1,
            ArtifactOutcome::Unreachable => {
                summary.unreachable += 1;
                return Ok(());
            }
        }

        if let Some(record) = &record {
            self.enqueue_assets(&identity, &target, record).await;
        }
        Ok(())
    }

    /// Dispatch to the resolver call matching the content kind
    async fn resolve(
        &mut self,
        identity: &ClassifiedIdentity,
        group: &str,
    ) -> Option<Resolution> {
        let resolver = self.resolver.as_mut()?;
        Some(match identity {
            ClassifiedIdentity::Continuous { title } => resolver.resolve_any(title).await,
            ClassifiedIdentity::Episode { show, .. } => resolver.resolve_show(show).await,
            ClassifiedIdentity::Feature { title, year } => {
                resolver.resolve_feature(title, *year, group).await
            }
        })
    }

    async fn enqueue_assets(
        &self,
        identity: &ClassifiedIdentity,
        target: &TargetPaths,
        record: &MetadataRecord,
    ) {
        if self.settings.images_enabled() {
            let size = &self.settings.tmdb_image_size;
            // Show artwork belongs at the show root, shared by episodes.
            let artwork_dir = match identity {
                ClassifiedIdentity::Episode { show, .. } => {
                    self.materializer.layout().show_root(show)
                }
                _ => target.directory.clone(),
            };
            if let Some(path) = &record.poster_path {
                self.assets
                    .enqueue(AssetJob::Image {
                        url: tmdb::image_url(size, path),
                        destination: artwork_dir.join(POSTER_FILE),
                    })
                    .await;
            }
            if let Some(path) = &record.backdrop_path {
                self.assets
                    .enqueue(AssetJob::Image {
                        url: tmdb::image_url(size, path),
                        destination: artwork_dir.join(BACKDROP_FILE),
                    })
                    .await;
            }
        }

        if self.settings.subtitles_enabled() {
            let job = match identity {
                ClassifiedIdentity::Feature { title, .. } => Some(AssetJob::Subtitle {
                    query: SubtitleQuery::movie(Some(record.id), title, record.year()),
                    destination: target.subtitle("en"),
                }),
                ClassifiedIdentity::Episode {
                    show,
                    season,
                    episode,
                } => Some(AssetJob::Subtitle {
                    query: SubtitleQuery::episode(Some(record.id), show, *season, *episode),
                    destination: target.subtitle("en"),
                }),
                // Continuous channels carry no subtitles.
                ClassifiedIdentity::Continuous { .. } => None,
            };
            if let Some(job) = job {
                self.assets.enqueue(job).await;
            }
        }
    }
}

/// Keep the groups matching any configured glob pattern, in catalog order
pub fn select_groups(groups: &[String], patterns: &[String]) -> Vec<String> {
    let compiled: Vec<Pattern> = patterns
        .iter()
        .filter_map(|raw| match Pattern::new(raw) {
            Ok(pattern) => Some(pattern),
            Err(error) => {
                warn!(pattern = raw, %error, "Ignoring invalid group pattern");
                None
            }
        })
        .collect();

    groups
        .iter()
        .filter(|group| compiled.iter().any(|pattern| pattern.matches(group)))
        .cloned()
        .collect()
}
