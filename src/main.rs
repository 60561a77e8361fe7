//! Catalog-Crawler main entry point
//!
//! This is the command-line interface for the Catalog-Crawler product
//! discovery crawler.

use catalog_crawler::config::{
    load_config_with_hash, load_seed_file, validate, Config, OutputFormat,
};
use catalog_crawler::crawler::crawl;
use catalog_crawler::output::{print_statistics, write_catalog, Catalog};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Catalog-Crawler: product discovery for commerce sites
///
/// Catalog-Crawler walks a shop's listing pages breadth-first, fetches every
/// product page it finds, and writes one merged record per product together
/// with the gender and category listings it appeared under.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Product discovery crawler for commerce sites", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site and write its product catalog
    Crawl(CrawlArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Site root, e.g. https://shop.example.com
    #[arg(long, required_unless_present = "config")]
    base: Option<String>,

    /// Path to a TOML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Delay between requests in seconds
    #[arg(long)]
    delay: Option<f64>,

    /// Discovery page budget
    #[arg(long)]
    pages: Option<usize>,

    /// Output format: json or csv
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Output file path
    #[arg(long, value_name = "FILE")]
    out: Option<String>,

    /// Extra seed URLs, comma-separated
    #[arg(long, value_delimiter = ',')]
    seeds: Vec<String>,

    /// File with one seed URL per line
    #[arg(long, value_name = "FILE")]
    seed_file: Option<PathBuf>,

    /// Product pages fetched at once in the detail pass
    #[arg(long)]
    concurrency: Option<usize>,

    /// Do not seed discovery from the site menu
    #[arg(long)]
    no_menu: bool,

    /// Honor robots.txt
    #[arg(long)]
    respect_robots: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Crawl(args) => handle_crawl(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
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

/// Builds the effective configuration from the config file and flags
fn build_config(args: &CrawlArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::for_site(args.base.as_deref().unwrap_or_default()),
    };

    if let Some(base) = &args.base {
        config.crawler.base_url = base.clone();
    }
    if let Some(delay) = args.delay {
        if !delay.is_finite() || delay < 0.0 {
            return Err(format!("--delay must be a non-negative number, got {}", delay).into());
        }
        config.http.delay_ms = (delay * 1000.0).round() as u64;
    }
    if let Some(pages) = args.pages {
        config.crawler.page_budget = pages;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(out) = &args.out {
        config.output.path = Some(out.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.crawler.detail_concurrency = concurrency;
    }
    if args.no_menu {
        config.crawler.seed_from_menu = false;
    }
    if args.respect_robots {
        config.crawler.respect_robots = true;
    }

    config
        .crawler
        .seeds
        .extend(args.seeds.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));
    if let Some(path) = &args.seed_file {
        let seeds = load_seed_file(path)?;
        tracing::info!("Loaded {} seeds from {}", seeds.len(), path.display());
        config.crawler.seeds.extend(seeds);
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    println!("=== Catalog-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Page budget: {}", config.crawler.page_budget);
    println!("  Listing link cap: {}", config.crawler.listing_link_cap);
    println!("  Sitemap limit: {}", config.crawler.sitemap_limit);
    println!("  Detail concurrency: {}", config.crawler.detail_concurrency);
    println!("  Seed from menu: {}", config.crawler.seed_from_menu);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    if let Some(max) = config.crawler.max_requests {
        println!("  Max requests: {}", max);
    }
    if let Some(secs) = config.crawler.max_duration_secs {
        println!("  Max duration: {}s", secs);
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Delay: {}ms", config.http.delay_ms);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Max attempts: {}", config.http.max_attempts);

    println!("\nOutput:");
    println!("  Format: {}", config.output.format);
    println!("  Path: {}", config.output_path());

    println!("\nExtra Seeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(args: CrawlArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;

    if args.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    tracing::info!(
        "Crawling {} (budget {} pages, {} extra seeds)",
        config.crawler.base_url,
        config.crawler.page_budget,
        config.crawler.seeds.len()
    );

    let outcome = crawl(&config).await?;

    let output_path = config.output_path();
    let catalog = Catalog::new(outcome.menu, outcome.products);
    write_catalog(&catalog, config.output.format, Path::new(&output_path))?;

    print_statistics(&outcome.statistics);
    println!("\n✓ Catalog written to: {}", output_path);
    Ok(())
}
