//! bestplace CLI - find the area satisfying every constraint

mod config;
mod pipeline;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bestplace_core::io::read_geojson;
use config::RunConfig;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "bestplace")]
#[command(author, version, long_about = None)]
#[command(about = "Find the best place to live from open city data")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (Helsinki defaults when missing)
    #[arg(short, long, global = true, default_value = "bestplace.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every configured dataset not yet in the cache
    Fetch,
    /// Derive the constraint layers and write them as GeoJSON
    Constraints {
        /// Output file
        #[arg(short, long, default_value = "constraints.geojson")]
        output: PathBuf,
    },
    /// Intersect the constraints of an exported constraint layer
    Aggregate {
        /// Constraint layer written by `constraints`
        input: PathBuf,
        /// Output file
        #[arg(short, long, default_value = "best_place.geojson")]
        output: PathBuf,
    },
    /// Fetch, derive and aggregate in one go
    Run {
        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },
    /// Show information about a GeoJSON file
    Info {
        /// Input GeoJSON file
        input: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

pub(crate) fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_config(path: &Path) -> Result<RunConfig> {
    let config = RunConfig::load(path)
        .with_context(|| format!("Failed to load configuration {}", path.display()))?;
    config.validate().context("Invalid configuration")?;
    if path.exists() {
        info!("Configuration: {}", path.display());
    } else {
        info!("No configuration at {}, using Helsinki defaults", path.display());
    }
    Ok(config)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Fetch => {
            let fetcher = pipeline::open_fetcher(&config)?;
            pipeline::fetch_all(&config, &fetcher)?;
        }

        Commands::Constraints { output } => {
            let fetcher = pipeline::open_fetcher(&config)?;
            let start = Instant::now();
            let set = pipeline::build_constraints(&config, &fetcher)?;
            let elapsed = start.elapsed();
            info!("{} constraint records: {}", set.len(), set.names().join(", "));
            pipeline::write_layer(&set.to_feature_collection(), &output)?;
            done("Constraints", &output, elapsed);
        }

        Commands::Aggregate { input, output } => {
            let set = pipeline::read_constraints(&input)?;
            let start = Instant::now();
            let result = pipeline::run_aggregate(&config, &set)?;
            let elapsed = start.elapsed();
            pipeline::report(&result);
            pipeline::write_layer(&result.to_feature_collection(), &output)?;
            done("Best place", &output, elapsed);
        }

        Commands::Run { output } => {
            let fetcher = pipeline::open_fetcher(&config)?;
            pipeline::fetch_all(&config, &fetcher)?;

            let start = Instant::now();
            let set = pipeline::build_constraints(&config, &fetcher)?;
            let result = pipeline::run_aggregate(&config, &set)?;
            let elapsed = start.elapsed();

            let constraints_path = output.join("constraints.geojson");
            pipeline::write_layer(&set.to_feature_collection(), &constraints_path)?;
            println!("Constraints saved to: {}", constraints_path.display());
            pipeline::export_context(&config, &fetcher, &output)?;

            pipeline::report(&result);
            let best_path = output.join("best_place.geojson");
            pipeline::write_layer(&result.to_feature_collection(), &best_path)?;
            done("Best place", &best_path, elapsed);
        }

        Commands::Info { input } => {
            let collection = read_geojson(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            println!("File: {}", input.display());
            println!("CRS: {}", collection.crs);
            println!(
                "Features: {} ({} with geometry)",
                collection.len(),
                collection.geometry_count()
            );

            let summary = pipeline::summarize(&collection);
            if !summary.is_empty() {
                println!("\nConstraints:");
                for (name, s) in &summary {
                    println!(
                        "  {:<20} {:>6} record(s) {:>16.1} m² {:>12.1} m perimeter",
                        name, s.records, s.area, s.perimeter
                    );
                }
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
