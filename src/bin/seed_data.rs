//! Seed data script - populates the facility store with sample San Francisco facilities
//!
//! Run with: cargo run --bin seed-data -- [--dry-run] [--database-url <URL>]

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use facility_finder::repositories::DatabaseFacilityRepository;
use facility_finder::seed::{sample_facilities, seed_repository};

#[derive(Parser, Debug)]
#[command(
    name = "seed-data",
    about = "Insert the sample facility catalog into the configured database"
)]
struct Cli {
    /// Print the sample facilities without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Override the configured database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let facilities = sample_facilities(Utc::now());

    if cli.dry_run {
        for facility in &facilities {
            info!(
                "{} [{}] {} at ({}, {}) - {} ratings, average {:.2}",
                facility.facility_id,
                facility.facility_type,
                facility.name,
                facility.location.lat,
                facility.location.lon,
                facility.rating.count,
                facility.rating.average_f64()
            );
        }
        info!("Dry run: {} facilities listed, nothing written", facilities.len());
        return Ok(());
    }

    let mut cfg = facility_finder::config::load_config().context("failed to load configuration")?;
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }
    if cfg.uses_in_memory_store() {
        anyhow::bail!("store_backend is in-memory; seeding only applies to a database store");
    }

    info!("Connecting to database");
    let db = facility_finder::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        facility_finder::db::run_migrations(&db).await?;
    }
    let repository = DatabaseFacilityRepository::new(Arc::new(db));

    let report = seed_repository(&repository, facilities).await?;
    info!(
        "Seed complete: {} inserted, {} already present",
        report.inserted, report.skipped
    );
    info!("Try: curl 'http://localhost:8080/api/v1/facilities/nearby?lat=37.7749&lon=-122.4194'");

    Ok(())
}
