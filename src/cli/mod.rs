//! Command-line interface for strmforge.
//!
//! Provides commands for running a full library pass, inspecting catalog
//! groups, testing name classification, and managing the skip cache.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::assets::{AssetPool, HttpAssetStore};
use crate::classify;
use crate::config::{self, Settings};
use crate::domain::{ClassifiedIdentity, SkipDomain};
use crate::library::{LibraryLayout, Materializer};
use crate::pipeline::{self, Pipeline};
use crate::resolve::{MetadataResolver, TmdbClient};
use crate::skiplist::{SkipList, SkipListGuard};
use crate::source::{CatalogSource, DispatchClient};

/// strmforge - turn a live-stream catalog into a .strm media library
#[derive(Parser, Debug)]
#[command(name = "strmforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the discovered one
    #[arg(short, long, global = true, env = "STRMFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one full pass: fetch, classify, resolve, materialize
    Run {
        /// Process only groups matching this pattern (overrides configuration)
        #[arg(short, long)]
        group: Option<String>,
    },

    /// List catalog groups, marking the ones configuration selects
    Groups,

    /// Show how one stream name is classified
    Classify {
        /// Raw stream name as the catalog lists it
        name: String,

        /// Group label the name was listed under
        #[arg(short, long, default_value = "")]
        group: String,
    },

    /// Inspect or clear the persistent skip cache
    Skiplist {
        /// Delete the skip cache file
        #[arg(long)]
        clear: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let settings = config::load(self.config.as_deref())?;

        match self.command {
            Commands::Run { group } => run_pass(settings, group).await,
            Commands::Groups => list_groups(settings).await,
            Commands::Classify { name, group } => classify_name(&settings, &name, &group),
            Commands::Skiplist { clear } => show_skiplist(&settings, clear).await,
        }
    }
}

/// Wire up the collaborators and run one full library pass
async fn run_pass(mut settings: Settings, group_override: Option<String>) -> Result<()> {
    if let Some(pattern) = group_override {
        settings.group_patterns = vec![pattern];
    }
    settings
        .validate_for_run()
        .context("Configuration is incomplete")?;

    let skip_cache_path = settings.skip_cache_file()?;
    // Held for the whole pass so two processes cannot interleave writes
    let _guard = SkipListGuard::acquire(&skip_cache_path)?;
    let skip_list = SkipList::load(&skip_cache_path).await;

    let client = Arc::new(DispatchClient::new(
        settings.api_base()?,
        settings.token_endpoint.clone(),
        settings.stream_base.clone(),
        settings.username.clone(),
        settings.password.clone(),
    )?);

    let layout = LibraryLayout::new(settings.destination_root()?);
    let materializer = Materializer::new(layout, client.clone())
        .with_sidecars(
            settings.write_sidecars,
            settings.write_sidecars_only_if_missing,
        )
        .with_liveness_probe(!settings.skip_liveness_check);

    let store = Arc::new(HttpAssetStore::new(settings.subtitle_credentials())?);
    let assets = AssetPool::start(store, settings.asset_workers, settings.asset_queue_depth);

    let resolver = match settings.tmdb_api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            let tmdb = TmdbClient::new(
                key.to_string(),
                settings.tmdb_language.clone(),
                settings.tmdb_image_size.clone(),
            )?;
            Some(MetadataResolver::new(Box::new(tmdb)))
        }
        None => {
            tracing::warn!("No TMDB API key configured, entries will not be resolved");
            None
        }
    };

    let mut pass = Pipeline::new(
        settings,
        client,
        materializer,
        skip_list,
        skip_cache_path,
        assets,
    );
    if let Some(resolver) = resolver {
        pass = pass.with_resolver(resolver);
    }

    let summary = pass.run().await?;

    let elapsed = summary.finished_at - summary.started_at;
    println!(
        "Run {} finished in {}s",
        summary.run_id,
        elapsed.num_seconds()
    );
    println!("  groups processed: {}", summary.groups_processed);
    println!("  entries seen:     {}", summary.entries_seen);
    println!("  created:          {}", summary.created);
    println!("  reused:           {}", summary.reused);
    println!("  unreachable:      {}", summary.unreachable);
    println!("  skip-listed:      {}", summary.skip_listed);
    println!("  rejected:         {}", summary.rejected);
    println!("  deferred:         {}", summary.deferred);
    println!("  failed:           {}", summary.failed);

    Ok(())
}

/// List every group the catalog knows, marking the selected ones
async fn list_groups(settings: Settings) -> Result<()> {
    let client = DispatchClient::new(
        settings.api_base()?,
        settings.token_endpoint.clone(),
        settings.stream_base.clone(),
        settings.username.clone(),
        settings.password.clone(),
    )?;

    let groups = client
        .groups()
        .await
        .context("Failed to list catalog groups")?;
    if groups.is_empty() {
        println!("The catalog lists no groups");
        return Ok(());
    }

    let selected = pipeline::select_groups(&groups, &settings.group_patterns);
    for group in &groups {
        let marker = if selected.contains(group) { "*" } else { " " };
        println!("{} {}", marker, group);
    }
    println!(
        "\n{} of {} groups selected by {:?}",
        selected.len(),
        groups.len(),
        settings.group_patterns
    );

    Ok(())
}

/// Print the classification of one raw name, and where its artifacts
/// would land when a destination root is configured
fn classify_name(settings: &Settings, name: &str, group: &str) -> Result<()> {
    let identity = classify::classify(name, group, &settings.strings_to_remove);

    match &identity {
        ClassifiedIdentity::Continuous { title } => {
            println!("kind:    continuous");
            println!("title:   {}", title);
        }
        ClassifiedIdentity::Episode {
            show,
            season,
            episode,
        } => {
            println!("kind:    episode");
            println!("show:    {}", show);
            println!("season:  {}", season);
            println!("episode: {}", episode);
        }
        ClassifiedIdentity::Feature { title, year } => {
            println!("kind:    feature");
            println!("title:   {}", title);
            if let Some(year) = year {
                println!("year:    {}", year);
            }
        }
    }
    println!("key:     {}", identity.key());

    if let Some(root) = settings.destination_root.as_ref() {
        let target = LibraryLayout::new(root).target(&identity);
        println!("target:  {}", target.reference.display());
    }

    Ok(())
}

/// Show skip-cache membership per domain, or delete the file
async fn show_skiplist(settings: &Settings, clear: bool) -> Result<()> {
    let path = settings.skip_cache_file()?;

    if clear {
        match std::fs::remove_file(&path) {
            Ok(()) => println!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                println!("Nothing to remove, {} does not exist", path.display());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to remove {}", path.display()));
            }
        }
        return Ok(());
    }

    let list = SkipList::load(&path).await;
    let domains = [
        ("shows", SkipDomain::Shows),
        ("movies", SkipDomain::Movies),
        ("continuous", SkipDomain::Continuous),
    ];

    for (label, domain) in domains {
        let set = list.set(domain);
        println!("{} ({})", label, set.len());
        for key in set {
            println!("  {}", key);
        }
    }

    Ok(())
}
