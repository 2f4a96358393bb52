//! Papermule main entry point
//!
//! Command-line interface for the Papermule catalog harvester.

use clap::Parser;
use papermule::config::load_config_with_hash;
use papermule::crawler::{CrawlOutcome, Crawler};
use papermule::fetch::{CatalogFetcher, HttpSession};
use papermule::pacing::{RateLimiter, RetryPolicy};
use papermule::{FileProgressStore, FileSink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Papermule: a resumable harvester for paginated catalog records
///
/// Papermule walks a paginated catalog listing page by page, persists each
/// record to disk, and checkpoints progress so an interrupted harvest
/// resumes at the exact page it stopped on.
#[derive(Parser, Debug)]
#[command(name = "papermule")]
#[command(version = "0.1.0")]
#[command(about = "A resumable catalog record harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume an interrupted harvest (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh harvest, discarding any previous checkpoint
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Override the configured download directory
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Validate config and show what would be harvested without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(dir) = &cli.output {
        config.output.download_dir = dir.to_string_lossy().into_owned();
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    if cli.fresh {
        discard_checkpoint(&config.output.checkpoint_path)?;
    }

    handle_harvest(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("papermule=info,warn"),
            1 => EnvFilter::new("papermule=debug,info"),
            2 => EnvFilter::new("papermule=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &papermule::Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Papermule Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.catalog.base_url);
    println!(
        "  Filter: {}",
        config.catalog.filter.as_deref().unwrap_or("(none)")
    );
    println!("  Records per page: {}", config.catalog.per_page);
    println!("  Start locator: {}", config.catalog.start_locator());
    println!("  Fetch timeout: {}s", config.catalog.fetch_timeout_secs);

    println!("\nSession:");
    println!("  Name: {}", config.session.harvester_name);
    println!("  Version: {}", config.session.harvester_version);
    println!("  Contact URL: {}", config.session.contact_url);
    println!("  Contact Email: {}", config.session.contact_email);

    println!("\nPacing:");
    println!(
        "  {} request(s) per {}ms, burst {}",
        config.pacing.requests_per_interval, config.pacing.interval_ms, config.pacing.burst_allowance
    );
    println!(
        "  Adaptive: {} (factor {}, ceiling {}ms)",
        config.pacing.adaptive, config.pacing.backoff_factor, config.pacing.max_interval_ms
    );

    println!("\nRetry:");
    println!(
        "  Up to {} attempts, delays {}ms..{}ms",
        config.retry.max_attempts, config.retry.base_delay_ms, config.retry.max_delay_ms
    );

    println!("\nOutput:");
    println!("  Download dir: {}", config.output.download_dir);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Removes the checkpoint file so the next run starts from page one
fn discard_checkpoint(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("Discarded previous checkpoint: {}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: papermule::Config,
    config_hash: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let base_url = Url::parse(&config.catalog.base_url)?;
    let session = HttpSession::new(&config.session, config.catalog.fetch_timeout())?;
    let fetcher = CatalogFetcher::new(
        session,
        base_url,
        config.catalog.per_page,
        config.catalog.filter.clone(),
        config.catalog.fetch_timeout(),
    );

    let store = FileProgressStore::new(&config.output.checkpoint_path);
    let sink = FileSink::new(&config.output.download_dir)?;
    let limiter = RateLimiter::new(config.pacing.clone());
    let policy = RetryPolicy::from_config(&config.retry);

    let mut crawler = Crawler::new(
        fetcher,
        store,
        sink,
        limiter,
        policy,
        config.catalog.start_locator(),
    )
    .with_config_hash(config_hash);

    // Ctrl-C asks for a stop at the next page boundary; the checkpoint
    // already committed stays valid either way.
    let stop = crawler.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received; finishing the current page");
            stop.request_stop();
        }
    });

    match crawler.run().await {
        Ok(CrawlOutcome::Completed(report)) => {
            tracing::info!(
                "Harvest complete: {} pages, {} items ({} skipped), {} retries",
                report.pages_completed,
                report.items_persisted,
                report.items_skipped,
                report.retries
            );
            Ok(())
        }
        Ok(CrawlOutcome::Aborted {
            locator,
            reason,
            report,
        }) => {
            tracing::error!(
                "Harvest aborted at {}: {} ({} pages and {} items persisted; rerun to resume)",
                locator,
                reason,
                report.pages_completed,
                report.items_persisted
            );
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
