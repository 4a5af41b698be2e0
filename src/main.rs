//! Siteloom main entry point
//!
//! Command-line interface for the siteloom site harvester.

use clap::Parser;
use siteloom::config::{load_config, OutputMode};
use siteloom::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Siteloom: a depth-bounded single-site content harvester
///
/// Siteloom crawls one site from seed URLs, extracts title, heading, and
/// paragraph text from each page, and writes the records to plain-text
/// destinations.
#[derive(Parser, Debug)]
#[command(name = "siteloom")]
#[command(version)]
#[command(about = "A depth-bounded single-site content harvester", long_about = None)]
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

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    tracing::info!(
        "Seeds: {}, allowed hosts: {}, max depth: {}",
        config.scope.seeds.len(),
        config.scope.allowed_hosts.len(),
        config.crawler.max_depth
    );

    match crawl(config).await {
        Ok(stats) => {
            tracing::info!(
                "Done: {} pages visited, {} records emitted",
                stats.pages_visited,
                stats.records_emitted
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("siteloom=info,warn"),
            1 => EnvFilter::new("siteloom=debug,info"),
            2 => EnvFilter::new("siteloom=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &siteloom::config::Config) {
    println!("=== Siteloom Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Per-host fetches: {}", config.crawler.per_host_fetches);
    println!(
        "  Delay: {}ms{}",
        config.crawler.delay_ms,
        if config.crawler.jitter {
            " (jittered)"
        } else {
            ""
        }
    );
    println!("  Retry limit: {}", config.crawler.retry_limit);
    println!(
        "  Retryable statuses: {:?}",
        config.crawler.retryable_statuses
    );
    println!(
        "  Tolerated statuses: {:?}",
        config.crawler.tolerated_statuses
    );

    println!("\nIdentity:");
    println!("  User agents in pool: {}", config.identity.user_agents.len());
    println!("  Bootstrap referer: {}", config.identity.bootstrap_referer);

    println!("\nScope:");
    for host in &config.scope.allowed_hosts {
        println!("  - {}", host);
    }

    println!("\nSeeds ({}):", config.scope.seeds.len());
    for seed in &config.scope.seeds {
        println!("  * {}", seed);
    }

    println!("\nOutput:");
    match config.output.mode {
        OutputMode::Single => println!("  Single file: {}", config.output.path),
        OutputMode::Regions => {
            println!("  Regions ({}):", config.output.regions.len());
            for region in &config.output.regions {
                println!("    - {} -> {}", region.name, region.path);
            }
            println!("  Unknown bucket: {}", config.output.unknown_path);
        }
    }

    println!("\n\u{2713} Configuration is valid");
    println!(
        "\u{2713} Would start crawling with {} seed URLs",
        config.scope.seeds.len()
    );
}
