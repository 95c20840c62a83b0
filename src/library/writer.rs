//! Idempotent materialization of reference files and sidecars.

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::{ClassifiedIdentity, MetadataRecord};
use crate::errors::PipelineError;
use crate::library::layout::{LibraryLayout, TargetPaths};
use crate::library::sidecar;
use crate::source::LivenessProber;

/// What `materialize` did for one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOutcome {
    /// Reference file newly written
    Created,
    /// Reference file already present; existing content is trusted
    AlreadyExists,
    /// Source failed the liveness probe; nothing was written
    Unreachable,
}

/// Writes the on-disk artifacts for accepted entries.
///
/// An existing reference file is never rewritten, and short-circuits the
/// liveness probe entirely. Sidecars are governed separately by the
/// configured write flags.
pub struct Materializer {
    layout: LibraryLayout,
    prober: Arc<dyn LivenessProber>,
    write_sidecars: bool,
    sidecars_only_if_missing: bool,
    probe_liveness: bool,
}

impl Materializer {
    pub fn new(layout: LibraryLayout, prober: Arc<dyn LivenessProber>) -> Self {
        Self {
            layout,
            prober,
            write_sidecars: true,
            sidecars_only_if_missing: true,
            probe_liveness: true,
        }
    }

    /// Set whether sidecars are written at all, and whether existing
    /// sidecar files are left untouched
    pub fn with_sidecars(mut self, write: bool, only_if_missing: bool) -> Self {
        self.write_sidecars = write;
        self.sidecars_only_if_missing = only_if_missing;
        self
    }

    /// Disable the pre-write liveness probe
    pub fn with_liveness_probe(mut self, probe: bool) -> Self {
        self.probe_liveness = probe;
        self
    }

    /// Destination paths for an identity
    pub fn target(&self, identity: &ClassifiedIdentity) -> TargetPaths {
        self.layout.target(identity)
    }

    pub fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    /// Probe the source, write the reference file if it does not exist,
    /// then write whichever sidecars the configuration calls for.
    pub async fn materialize(
        &self,
        identity: &ClassifiedIdentity,
        target: &TargetPaths,
        record: Option<&MetadataRecord>,
        source_url: &str,
    ) -> Result<ArtifactOutcome, PipelineError> {
        let outcome = if target.reference.exists() {
            info!(path = %target.reference.display(), "Reference file already present, reusing");
            ArtifactOutcome::AlreadyExists
        } else {
            if self.probe_liveness && !self.prober.is_reachable(source_url).await {
                warn!(url = source_url, "Source unreachable, skipping entry");
                return Ok(ArtifactOutcome::Unreachable);
            }
            self.write_reference(&target.reference, source_url).await?;
            ArtifactOutcome::Created
        };

        if self.write_sidecars {
            if let Some(record) = record {
                self.write_sidecars_for(identity, target, record).await?;
            }
        }

        Ok(outcome)
    }

    async fn write_reference(&self, path: &Path, source_url: &str) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| PipelineError::filesystem(parent, source))?;
        }
        fs::write(path, source_url)
            .await
            .map_err(|source| PipelineError::filesystem(path, source))?;
        info!(path = %path.display(), url = source_url, "Wrote reference file");
        Ok(())
    }

    async fn write_sidecars_for(
        &self,
        identity: &ClassifiedIdentity,
        target: &TargetPaths,
        record: &MetadataRecord,
    ) -> Result<(), PipelineError> {
        match identity {
            ClassifiedIdentity::Continuous { .. } | ClassifiedIdentity::Feature { .. } => {
                self.write_sidecar(&target.sidecar, &sidecar::movie(record))
                    .await
            }
            ClassifiedIdentity::Episode {
                show,
                season,
                episode,
            } => {
                self.write_sidecar(&self.layout.show_sidecar(show), &sidecar::show(record))
                    .await?;
                self.write_sidecar(
                    &target.sidecar,
                    &sidecar::episode(record, *season, *episode),
                )
                .await
            }
        }
    }

    async fn write_sidecar(&self, path: &Path, xml: &str) -> Result<(), PipelineError> {
        if self.sidecars_only_if_missing && path.exists() {
            debug!(path = %path.display(), "Sidecar already present, skipping");
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| PipelineError::filesystem(parent, source))?;
        }
        fs::write(path, xml)
            .await
            .map_err(|source| PipelineError::filesystem(path, source))?;
        info!(path = %path.display(), "Wrote sidecar");
        Ok(())
    }
}
