//! Query tool for coverage and proximity lookups.
//!
//! Loads a dataset into the in-memory store and answers one query per run,
//! printing the result as JSON on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use delivery_coverage::store::MemoryStore;
use delivery_coverage::CoverageService;

mod config;
use config::Config;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Coverage and proximity queries over a delivery network")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON dataset (overrides [store] dataset)
    #[arg(long)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Is the client inside one of the company's coverage polygons?
    Check {
        #[arg(allow_negative_numbers = true)]
        client: i32,
        #[arg(allow_negative_numbers = true)]
        company: i32,
    },
    /// Is the client inside a polygon or within the radius of the company?
    CheckRadius {
        #[arg(allow_negative_numbers = true)]
        client: i32,
        #[arg(allow_negative_numbers = true)]
        company: i32,
        #[arg(long, allow_negative_numbers = true)]
        radius: Option<f64>,
    },
    /// Coverage details for a client and company
    Details {
        #[arg(allow_negative_numbers = true)]
        client: i32,
        #[arg(allow_negative_numbers = true)]
        company: i32,
        #[arg(long, allow_negative_numbers = true)]
        radius: Option<f64>,
    },
    /// All companies covering a client
    Coverages {
        #[arg(allow_negative_numbers = true)]
        client: i32,
        #[arg(long, allow_negative_numbers = true)]
        radius: Option<f64>,
    },
    /// Clients closest to a company
    NearestClients {
        #[arg(allow_negative_numbers = true)]
        company: i32,
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Companies closest to a client
    NearestCompanies {
        #[arg(allow_negative_numbers = true)]
        client: i32,
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Farthest open delivery for each company
    Farthest,
    /// Clients farther than a distance from every company
    Beyond {
        #[arg(long, allow_negative_numbers = true)]
        distance: Option<f64>,
    },
}

#[derive(Serialize)]
struct CheckResponse {
    covered: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dataset = args
        .dataset
        .clone()
        .or_else(|| config.store.dataset.clone())
        .context("No dataset given; pass --dataset or set [store] dataset")?;

    info!("Delivery coverage query");
    let store = MemoryStore::load_from_file(&dataset)
        .with_context(|| format!("Failed to load dataset {}", dataset.display()))?;
    let snapshot = store.snapshot()?;
    info!(
        "Dataset revision {} published at {}",
        snapshot.revision(),
        snapshot.published_at().to_rfc3339()
    );
    let service = CoverageService::new(store);

    let default_radius = config.coverage.default_radius_meters;
    let default_limit = config.ranking.default_limit;

    let output = match args.command {
        Command::Check { client, company } => {
            let covered = service.check_coverage(client, company).await?;
            serde_json::to_string_pretty(&CheckResponse { covered })?
        }
        Command::CheckRadius {
            client,
            company,
            radius,
        } => {
            let radius = radius
                .or(default_radius)
                .context("No radius given; pass --radius or set [coverage] default_radius_meters")?;
            let covered = service
                .check_coverage_with_radius(client, company, radius)
                .await?;
            serde_json::to_string_pretty(&CheckResponse { covered })?
        }
        Command::Details {
            client,
            company,
            radius,
        } => {
            let result = service
                .coverage_details(client, company, radius.or(default_radius))
                .await?;
            serde_json::to_string_pretty(&result)?
        }
        Command::Coverages { client, radius } => {
            let results = service
                .client_coverages(client, radius.or(default_radius))
                .await?;
            serde_json::to_string_pretty(&results)?
        }
        Command::NearestClients { company, limit } => {
            let ranked = service
                .nearest_clients(company, limit.unwrap_or(default_limit))
                .await?;
            serde_json::to_string_pretty(&ranked)?
        }
        Command::NearestCompanies { client, limit } => {
            let ranked = service
                .nearest_companies(client, limit.unwrap_or(default_limit))
                .await?;
            serde_json::to_string_pretty(&ranked)?
        }
        Command::Farthest => {
            let farthest = service.farthest_open_delivery_per_company().await?;
            serde_json::to_string_pretty(&farthest)?
        }
        Command::Beyond { distance } => {
            let beyond = service
                .clients_beyond(distance.unwrap_or(config.ranking.beyond_distance_meters))
                .await?;
            serde_json::to_string_pretty(&beyond)?
        }
    };

    println!("{}", output);
    Ok(())
}
