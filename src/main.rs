//! Revstrata: stratified product-review sampling
//!
//! CLI entry point: discover products per brand, sample their reviews
//! stratified by rating bucket, and enrich the results.

use anyhow::Result;
use clap::{Parser, Subcommand};
use revstrata::config::{Config, LogFormat, LogLevel};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "revstrata")]
#[command(about = "Stratified product-review sampling over a rendered-page proxy")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "revstrata.toml")]
    config: PathBuf,

    /// Results directory override
    #[arg(short, long)]
    results_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Discover a brand's products and write its seed file
    Discover {
        /// Brand to crawl (must have a configured catalog filter)
        #[arg(short, long)]
        brand: String,

        /// Maximum products to collect
        #[arg(short, long)]
        max_products: Option<usize>,
    },

    /// Sample reviews for a brand's seeded products
    Sample {
        /// Brand whose seed file to process
        #[arg(short, long)]
        brand: String,
    },

    /// Annotate a brand's records with summaries and sentiment tags
    Enrich {
        /// Brand whose store to annotate
        #[arg(short, long)]
        brand: String,

        /// Only add summaries
        #[arg(long, conflicts_with = "sentiments_only")]
        summaries_only: bool,

        /// Only add sentiment tags
        #[arg(long)]
        sentiments_only: bool,
    },

    /// Run discover, sample, and enrich for one or more brands
    Run {
        /// Brands to process (defaults to all configured brands)
        #[arg(short, long)]
        brand: Vec<String>,

        /// Maximum products per brand
        #[arg(short, long)]
        max_products: Option<usize>,

        /// Skip the enrichment stage
        #[arg(long)]
        skip_enrich: bool,
    },

    /// Show per-brand store statistics
    Stats {
        /// Brand to inspect (defaults to all configured brands)
        brand: Option<String>,
    },
}

fn level_for(config: &LogLevel) -> Level {
    match config {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load or create config; credentials resolve from the environment
    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        let mut config = Config::default();
        config.credentials.resolve_env();
        config.enrich.resolve_env();
        config
    };

    if let Some(results_dir) = cli.results_dir {
        config.output.results_dir = results_dir;
    }

    // Setup logging; -v flags override the configured level
    let log_level = match cli.verbose {
        0 => level_for(&config.logging.level),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let builder = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false);
    match config.logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }

    match cli.command {
        Commands::Init { path } => commands::init::init_config(path).await,
        Commands::Discover {
            brand,
            max_products,
        } => commands::discover::discover_brand(&config, &brand, max_products).await,
        Commands::Sample { brand } => commands::sample::sample_brand(&config, &brand).await,
        Commands::Enrich {
            brand,
            summaries_only,
            sentiments_only,
        } => {
            let summaries = !sentiments_only;
            let sentiments = !summaries_only;
            commands::enrich::enrich_brand(&config, &brand, summaries, sentiments).await
        }
        Commands::Run {
            brand,
            max_products,
            skip_enrich,
        } => commands::run::run_pipeline(&config, brand, max_products, skip_enrich).await,
        Commands::Stats { brand } => commands::stats::show_stats(&config, brand).await,
    }
}
