use std::path::PathBuf;

use anyhow::{Context, Result};
use catalog_engine::{CatalogEngine, EngineConfig, LogProgressSink};
use catalog_logging::{catalog_info, LogDestination};
use log::LevelFilter;

const BANNER_WIDTH: usize = 60;

fn main() -> Result<()> {
    // Terminal for the operator, ./catalog.log for the record of the run.
    catalog_logging::initialize(LogDestination::Both, LevelFilter::Info);

    let rule = "=".repeat(BANNER_WIDTH);
    catalog_info!("{}", rule);
    catalog_info!("Apify Actors Fetcher");
    catalog_info!("{}", rule);

    let output_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let engine = CatalogEngine::new(EngineConfig::default_with_output(output_dir));

    // One request at a time; a single-threaded runtime is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let report = runtime
        .block_on(engine.run(&LogProgressSink))
        .context("catalog export failed")?;

    if report.export.record_count == 0 {
        catalog_info!("No actors were fetched. Please check the API connection.");
    }
    catalog_info!(
        "Done: {} actors written after {} pages and {} retries ({})",
        report.export.record_count,
        report.pages,
        report.retries,
        report.stop
    );
    catalog_info!("{}", rule);
    Ok(())
}
