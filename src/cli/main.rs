//! Command-line geocoder.
//!
//! Resolves single addresses, geocodes a column of a CSV file, and lists the
//! supported country filters.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use alder::batch::{read_csv, write_csv};
use alder::countries::{list_countries, GLOBAL_CODE, GLOBAL_LABEL};
use alder::report::{Collector, Severity};
use alder::{BatchRunner, Config, CountryScope, Credentials};

#[derive(Parser, Debug)]
#[command(name = "geocode")]
#[command(about = "Convert addresses to latitude and longitude coordinates")]
struct Args {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Google Maps API key (overrides the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a single address
    Lookup {
        /// Address text
        address: String,

        /// Country code to restrict the search to, or GLOBAL
        #[arg(long, default_value = GLOBAL_CODE)]
        country: String,
    },

    /// Geocode every row of a CSV file
    Batch {
        /// Input CSV file (.csv or .csv.gz)
        #[arg(short, long)]
        input: PathBuf,

        /// Column containing the addresses
        #[arg(long)]
        column: String,

        /// Output CSV file
        #[arg(short, long, default_value = "geocoded_results.csv")]
        output: PathBuf,

        /// Country code to restrict the search to, or GLOBAL
        #[arg(long, default_value = GLOBAL_CODE)]
        country: String,

        /// Seconds to wait between rows (overrides the config file)
        #[arg(long)]
        delay: Option<f64>,
    },

    /// List the supported country codes
    Countries,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    let credentials = match &args.api_key {
        Some(key) => Credentials::new(key.clone()),
        None => config.credentials(),
    };

    match args.command {
        Command::Lookup { address, country } => {
            lookup(&config, &address, &country, credentials.as_ref()).await
        }
        Command::Batch {
            input,
            column,
            output,
            country,
            delay,
        } => {
            let delay = match delay {
                Some(secs) => Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("Invalid delay: {}", secs))?,
                None => config.batch_delay()?,
            };
            batch(
                &config,
                &input,
                &column,
                &output,
                &country,
                delay,
                credentials.as_ref(),
            )
            .await
        }
        Command::Countries => {
            println!("{}\t{}", GLOBAL_CODE, GLOBAL_LABEL);
            for country in list_countries() {
                println!("{}\t{}", country.code, country.name);
            }
            Ok(())
        }
    }
}

async fn lookup(
    config: &Config,
    address: &str,
    country: &str,
    credentials: Option<&Credentials>,
) -> Result<()> {
    if address.trim().is_empty() {
        anyhow::bail!("Address must not be empty");
    }

    let scope = CountryScope::from_code(country)?;
    let resolver = config.build_resolver()?;

    info!("Getting coordinates for '{}' ({})", address, scope);

    match resolver.resolve(address, &scope, credentials).await {
        Some(result) => {
            println!("Latitude:   {:.6}", result.latitude);
            println!("Longitude:  {:.6}", result.longitude);
            println!("Confidence: {}", result.confidence);
            println!();
            println!("Original Address:");
            println!("{}", result.original_address);
            println!();
            println!("Matched Address:");
            println!("{}", result.matched_address);
            println!();
            println!("Match Level: {}", result.match_level);
            Ok(())
        }
        None => {
            eprintln!("Could not find location. Please try a different address.");
            std::process::exit(1);
        }
    }
}

async fn batch(
    config: &Config,
    input: &Path,
    column: &str,
    output: &Path,
    country: &str,
    delay: Duration,
    credentials: Option<&Credentials>,
) -> Result<()> {
    let scope = CountryScope::from_code(country)?;
    let mut table = read_csv(input).context("Failed to read input CSV")?;

    if table.column_index(column).is_none() {
        anyhow::bail!(
            "Column '{}' not found; available columns: {}",
            column,
            table.headers().join(", ")
        );
    }

    let collector = Arc::new(Collector::new());
    let resolver = config.build_resolver()?.with_reporter(collector.clone());
    let runner = BatchRunner::new(resolver).with_delay(delay);

    let pb = ProgressBar::new(table.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )?
            .progress_chars("#>-"),
    );

    let summary = runner
        .run(&mut table, column, &scope, credentials, |progress| {
            pb.set_position(progress.completed as u64);
        })
        .await?;
    pb.finish_with_message("Processing complete!");

    write_csv(&table, output).context("Failed to write output CSV")?;

    println!(
        "Processed {} rows: {} matched, {} not found, {} skipped (blank)",
        summary.total, summary.matched, summary.unmatched, summary.skipped
    );
    let warnings = collector.count(Severity::Warning);
    let errors = collector.count(Severity::Error);
    if warnings + errors > 0 {
        println!("{} warnings, {} errors (see log)", warnings, errors);
    }
    println!("Results written to {}", output.display());

    Ok(())
}
