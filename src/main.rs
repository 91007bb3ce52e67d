//! onyx-harvest main entry point
//!
//! This is the command-line interface for the Onyx documentation crawler,
//! repository harvester and corpus search.

use anyhow::Context;
use clap::Parser;
use onyx_harvest::config::{load_config_with_hash, Config};
use onyx_harvest::github::RepositoryRef;
use onyx_harvest::search::open_engine;
use onyx_harvest::{crawler, github, SearchSource};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// onyx-harvest: Onyx documentation and repository corpus builder
///
/// Crawls the configured documentation sites, walks the configured source
/// repositories, stores both as flat JSON corpora and answers keyword
/// searches over them.
#[derive(Parser, Debug)]
#[command(name = "onyx-harvest")]
#[command(version)]
#[command(about = "Onyx documentation crawler and repository harvester", long_about = None)]
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

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with_all = ["stats", "search", "examples"])]
    dry_run: bool,

    /// Show statistics from the data directory and exit
    #[arg(long, conflicts_with_all = ["dry_run", "search", "examples"])]
    stats: bool,

    /// Keyword search across the corpora, printed as JSON
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["dry_run", "stats", "examples"])]
    search: Option<String>,

    /// Topic search over repository examples, printed as JSON
    #[arg(long, value_name = "TOPIC", conflicts_with_all = ["dry_run", "stats", "search"])]
    examples: Option<String>,

    /// Only crawl the documentation sites
    #[arg(long, conflicts_with = "github_only")]
    docs_only: bool,

    /// Only harvest the repositories
    #[arg(long, conflicts_with = "docs_only")]
    github_only: bool,

    /// Recrawl seeds even if they are still fresh
    #[arg(long)]
    force: bool,

    /// Restrict --search to a source (docs, github, patterns); repeatable
    #[arg(long = "source", value_name = "SOURCE")]
    sources: Vec<SearchSource>,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = &cli.search {
        handle_search(&config, query, &cli.sources, cli.limit)?;
    } else if let Some(topic) = &cli.examples {
        handle_examples(&config, topic, cli.limit)?;
    } else {
        handle_harvest(&config, &cli).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("onyx_harvest=info,warn"),
            1 => EnvFilter::new("onyx_harvest=debug,info"),
            2 => EnvFilter::new("onyx_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so JSON search output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) {
    println!("=== onyx-harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Delay between fetches: {}ms", config.crawler.delay_ms);
    println!("  Request timeout: {}s", config.crawler.timeout_secs);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!(
        "  Max consecutive failures: {}",
        config.crawler.max_consecutive_failures
    );
    println!("  Freshness: {} days", config.crawler.freshness_days);

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("Data directory: {}", config.output.data_dir);

    println!("\nDocumentation Sites ({}):", config.sites.len());
    for site in &config.sites {
        println!("  - {}", site.seed);
        for prefix in &site.allow_prefixes {
            println!("    * allow {}", prefix);
        }
    }

    println!("\nRepositories ({}):", config.github.repositories.len());
    for raw in &config.github.repositories {
        match RepositoryRef::parse(raw) {
            Ok(repository) => println!("  - {}", repository),
            Err(e) => println!("  - {} (skipped: {})", raw, e),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarises the persisted corpora
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use onyx_harvest::output::{load_statistics, print_statistics};
    use onyx_harvest::storage::JsonStorage;

    println!("Data directory: {}\n", config.output.data_dir);

    let storage = JsonStorage::open(Path::new(&config.output.data_dir));
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --search mode
fn handle_search(
    config: &Config,
    query: &str,
    sources: &[SearchSource],
    limit: usize,
) -> anyhow::Result<()> {
    let engine = open_engine(Path::new(&config.output.data_dir));
    print_json(&engine.search_all(query, sources, limit))
}

/// Handles the --examples mode
fn handle_examples(config: &Config, topic: &str, limit: usize) -> anyhow::Result<()> {
    let engine = open_engine(Path::new(&config.output.data_dir));
    match engine.search_github_examples(topic, limit) {
        Ok(results) => print_json(&results),
        Err(e) => print_json(&e),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handles the default mode: docs crawl, then repository harvest
async fn handle_harvest(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    if !cli.github_only {
        tracing::info!(
            "Crawling {} documentation site(s){}",
            config.sites.len(),
            if cli.force { " (forced)" } else { "" }
        );

        let report = crawler::crawl(config, cli.force)
            .await
            .context("documentation crawl failed")?;

        if report.persisted {
            tracing::info!(
                "Docs crawl {}: {} pages fetched, {} documents stored, {} failures",
                report.state,
                report.urls_crawled,
                report.documents_persisted,
                report.failures
            );
        } else {
            tracing::info!("All documentation seeds are fresh, nothing crawled");
        }
    }

    if !cli.docs_only {
        tracing::info!(
            "Harvesting {} repositories",
            config.github.repositories.len()
        );

        let report = github::harvest(config)
            .await
            .context("repository harvest failed")?;

        tracing::info!(
            "Harvest complete: {} repositories ({} degraded), {} files, {} patterns, {} topics",
            report.repositories,
            report.degraded,
            report.files,
            report.patterns,
            report.topics
        );
        if !report.invalid_references.is_empty() {
            tracing::warn!(
                "Skipped invalid repository references: {}",
                report.invalid_references.join(", ")
            );
        }
    }

    Ok(())
}
