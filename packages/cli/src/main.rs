#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `spendmap`: renders the city spending heatmap report.
//!
//! Loads the transaction CSV, aggregates spending per quarter, category
//! and city, obtains building footprints (from the cache blob or the
//! network), then writes one 3D building artifact per slice and the
//! interactive page that ties them together.
//!
//! Uses `indicatif-log-bridge` (via [`spendmap_cli_utils::init_logger`])
//! so log lines and progress bars share the terminal cleanly.

mod config;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "spendmap", about = "City spending heatmap report generator")]
struct Cli {
    /// Config file (defaults to `spendmap.toml` when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fetch buildings from the network even if `use_cache` is set
    #[arg(long)]
    fetch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = spendmap_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.fetch {
        config.use_cache = false;
    }

    let page = pipeline::run(&config, &multi).await?;
    log::info!("Report ready: {}", page.display());

    Ok(())
}
