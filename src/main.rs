//! Glosswalk main entry point
//!
//! Command-line interface for the resumable glossary crawler. A plain
//! invocation with no flags runs one time-bounded crawl and exits 0, even
//! when the checkpoint says there is nothing left to do.

use clap::Parser;
use glosswalk::config::load_config_or_default;
use glosswalk::crawler::crawl;
use glosswalk::store::{load_statistics, print_statistics, Checkpoint, RecordStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Glosswalk: a resumable glossary crawler
///
/// Crawls a glossary site page-by-page in short, time-bounded runs. Progress
/// and extracted entries are persisted under a data directory (the `DATA_DIR`
/// environment variable, default `data`), so repeated runs pick up where the
/// last one stopped.
#[derive(Parser, Debug)]
#[command(name = "glosswalk")]
#[command(version = "1.0.0")]
#[command(about = "A resumable glossary crawler", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the planned page range without crawling
    #[arg(long, conflicts_with_all = ["stats", "rebuild_index"])]
    dry_run: bool,

    /// Show store statistics and exit
    #[arg(long, conflicts_with_all = ["dry_run", "rebuild_index"])]
    stats: bool,

    /// Rebuild the duplicate index from the shards and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    rebuild_index: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.rebuild_index {
        handle_rebuild_index(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("glosswalk=info,warn"),
            1 => EnvFilter::new("glosswalk=debug,info"),
            2 => EnvFilter::new("glosswalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the planned range
fn handle_dry_run(config: &glosswalk::Config) {
    println!("=== Glosswalk Dry Run ===\n");

    println!("Crawl:");
    println!("  Page range: {} to {}", config.crawl.start_page, config.crawl.max_page);
    println!("  Pages per run: {}", config.crawl.pages_per_run);
    println!("  Batch size: {}", config.crawl.batch_size);
    println!(
        "  Run budget: {:.2} hours",
        config.crawl.max_runtime_secs as f64 / 3600.0
    );

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Host: {}", config.site.host);
    println!("  Link patterns: {:?}", config.site.link_patterns);

    println!("\nStorage:");
    println!("  Data directory: {}", config.storage.data_dir);
    println!("  Shard prefix: {}", config.storage.shard_prefix);
    println!("  Shard ceiling: {} MB", config.storage.max_shard_mb);

    let checkpoint = Checkpoint::new(Path::new(&config.storage.data_dir), config.crawl.start_page);
    let last_page = checkpoint.load();
    println!("\n✓ Configuration is valid");
    if last_page >= config.crawl.max_page {
        println!("✓ Nothing to do: all pages are processed");
    } else {
        let first = last_page + 1;
        let target = last_page
            .saturating_add(config.crawl.pages_per_run)
            .min(config.crawl.max_page);
        println!("✓ Would process pages {} to {}", first, target);
    }
}

/// Handles the --stats mode: shows store statistics
fn handle_stats(config: &glosswalk::Config) -> anyhow::Result<()> {
    println!("Data directory: {}\n", config.storage.data_dir);

    let store = RecordStore::open(&config.storage)?;
    let checkpoint = Checkpoint::new(Path::new(&config.storage.data_dir), config.crawl.start_page);

    let stats = load_statistics(&store, &checkpoint)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --rebuild-index mode: forces a fresh index from the shards
fn handle_rebuild_index(config: &glosswalk::Config) -> anyhow::Result<()> {
    println!("Data directory: {}\n", config.storage.data_dir);

    let mut store = RecordStore::open(&config.storage)?;
    let count = store.rebuild_index()?;
    println!("✓ Index rebuilt with {} record(s)", count);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: glosswalk::Config) -> anyhow::Result<()> {
    tracing::info!("Starting crawl run");
    tracing::info!(
        "Page range {}..={}, data directory {}",
        config.crawl.start_page,
        config.crawl.max_page,
        config.storage.data_dir
    );

    match crawl(config).await {
        Ok(_summary) => {
            tracing::info!("Run finished");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
