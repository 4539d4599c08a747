//! ephys-scraper main entry point
//!
//! This is the command-line interface for the site mirror.

use clap::Parser;
use ephys_scraper::config::{load_config_with_hash, validate, Config, NavigatorBackend};
use ephys_scraper::crawler::crawl;
use ephys_scraper::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ephys-scraper: a depth-first site mirror
///
/// Crawls a single site from its root URL, writes the main content of every
/// page as markdown next to the page's images, and finishes with a log.json
/// manifest of visited pages, skipped links and image write counts.
#[derive(Parser, Debug)]
#[command(name = "ephys-scraper")]
#[command(version)]
#[command(about = "A depth-first site mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Directory under which the timestamped run directory is created
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Load pages in a headless browser through this WebDriver endpoint
    #[arg(short = 'U', long, value_name = "WEBDRIVER_URL")]
    webdriver_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(directory) = cli.output {
        config.output.directory = directory;
    }
    if let Some(webdriver_url) = cli.webdriver_url {
        config.navigation.backend = NavigatorBackend::WebDriver;
        config.navigation.webdriver_url = webdriver_url;
    }
    validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Loads the configuration file, or validates the defaults when there is none
fn load(path: Option<&std::path::Path>) -> Result<Config, ephys_scraper::ConfigError> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ephys_scraper=info,warn"),
            1 => EnvFilter::new("ephys_scraper=debug,info"),
            2 => EnvFilter::new("ephys_scraper=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== ephys-scraper Dry Run ===\n");

    println!("Site:");
    println!("  Root URL: {}", config.site.root_url);
    println!("  Domain: {} (www. prefix accepted)", config.site.domain);
    println!("  Main content: {}", config.site.main_content_selector);

    println!("\nNavigation:");
    match config.navigation.backend {
        NavigatorBackend::Http => println!("  Backend: http (no script execution)"),
        NavigatorBackend::WebDriver => {
            println!("  Backend: webdriver at {}", config.navigation.webdriver_url)
        }
    }
    println!("  User agent: {}", config.navigation.user_agent);
    println!("  Timeout: {}s", config.navigation.timeout_secs);

    println!("\nOutput:");
    println!("  Directory: {}/<start time in epoch ms>", config.output.directory);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", config.site.root_url);
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match crawl(config).await {
        Ok(outcome) => {
            tracing::info!("Manifest written to {}", outcome.manifest_path.display());
            print_statistics(&outcome.statistics);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
