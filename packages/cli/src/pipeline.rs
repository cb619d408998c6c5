//! End-to-end report run.
//!
//! Stages run strictly in order: aggregate spending, obtain buildings,
//! geocode cities, write artifacts, write the page.

use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spendmap_buildings::cache::{BuildingSource, get_buildings};
use spendmap_buildings::overpass::OverpassProvider;
use spendmap_cli_utils::{IndicatifProgress, MultiProgress};
use spendmap_geocoder::nominatim::NominatimClient;
use spendmap_report::{PageCity, PageData, build_city_entries, generate_citymaps, write_page};
use spendmap_spending::aggregate::{aggregate, categories, quarters};
use spendmap_spending::load::load_transactions;

use crate::config::Config;

/// Runs every stage and returns the path of the written page.
///
/// # Errors
///
/// Returns an error for fatal preconditions: an unreadable CSV, a missing
/// building cache when one is requested, or an unwritable output
/// directory. Failures for a single city are logged and skipped.
pub async fn run(
    config: &Config,
    multi: &MultiProgress,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let start = Instant::now();

    // --- 1. Spending ---
    let loaded = load_transactions(&config.transactions_csv)?;
    if loaded.skipped > 0 {
        log::warn!("Skipped {} unparseable transaction rows", loaded.skipped);
    }
    let transactions = loaded.transactions;

    let category_list = categories(&transactions);
    let quarter_list = quarters(&transactions);
    let (spending, percentages) = aggregate(&transactions, &config.cities, &quarter_list);
    log::info!(
        "{} transactions, {} quarters, {} categories",
        transactions.len(),
        quarter_list.len(),
        category_list.len()
    );

    // --- 2. Buildings ---
    let client = reqwest::Client::builder()
        .user_agent(config.providers.user_agent.as_str())
        .build()?;
    let nominatim = |client: &reqwest::Client| {
        NominatimClient::new(
            client.clone(),
            &config.providers.nominatim_url,
            config.providers.rate_limit_ms,
        )
    };
    let provider = OverpassProvider::new(
        client.clone(),
        &config.providers.overpass_url,
        nominatim(&client),
    );

    let mut rng = config
        .seed
        .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);

    let source = BuildingSource {
        provider: &provider,
        cache_path: &config.cache_path,
        simplify_tolerance: config.simplify_tolerance,
    };
    let fetch_progress = IndicatifProgress::stage_bar(multi, "Fetching buildings");
    let city_buildings = get_buildings(
        &config.cities,
        config.use_cache,
        &source,
        &mut rng,
        fetch_progress.as_ref(),
    )
    .await?;

    // --- 3. Coordinates ---
    let geocoder = nominatim(&client);
    let cities = build_city_entries(&city_buildings, &geocoder, &config.overrides).await;

    // --- 4. Artifacts ---
    let render_progress = IndicatifProgress::stage_bar(multi, "Rendering city maps");
    let (scale_ranges, artifacts) = generate_citymaps(
        &quarter_list,
        &category_list,
        &percentages,
        &cities,
        &config.output_dir,
        render_progress.as_ref(),
    )?;

    // --- 5. Page ---
    let page_cities: Vec<PageCity> = cities
        .iter()
        .map(|city| PageCity {
            name: city.name.clone(),
            index: city.index,
        })
        .collect();
    let page = write_page(
        &config.output_dir,
        &PageData {
            title: &config.title,
            quarters: &quarter_list,
            categories: &category_list,
            cities: &page_cities,
            spending: &spending,
            percentages: &percentages,
            scale_ranges: &scale_ranges,
            artifacts: &artifacts,
        },
    )?;

    log::info!("Pipeline finished in {:.1}s", start.elapsed().as_secs_f64());
    Ok(page)
}
