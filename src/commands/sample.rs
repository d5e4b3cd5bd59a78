use anyhow::{Context, Result};
use revstrata::{
    config::Config,
    scraping::{RenderClient, SamplingCoordinator},
    store::OutputStore,
    types::ProductRecord,
    util::truncate_for_display,
};
use tracing::warn;

/// Sample reviews for every seeded product of a brand.
///
/// One record is appended per seed, empty when the product run fails, and
/// a failure never aborts the batch: the store is the authority on what
/// succeeded.
pub async fn sample_brand(config: &Config, brand: &str) -> Result<()> {
    let store = OutputStore::open(&config.output.results_dir)
        .context("Failed to open results directory")?;

    let seeds = store.load_seeds(brand)?;
    if seeds.is_empty() {
        println!(
            "No seeds found for '{}'. Run `discover --brand {}` first.",
            brand, brand
        );
        return Ok(());
    }

    let fetcher = RenderClient::new(&config.fetch, &config.credentials)
        .context("Failed to create rendering client")?;
    let mut coordinator = SamplingCoordinator::new(&fetcher, &config.sampling);

    let mut sampled = 0usize;
    let mut emptied = 0usize;
    for seed in &seeds {
        if !seed.is_valid() {
            warn!("Skipping seed without a product id");
            continue;
        }
        println!("=== Processing product: {} ===", seed.asin);
        let record = match coordinator.process(seed).await {
            Ok(record) => {
                if let Some(title) = &record.title {
                    println!(
                        "{}: {} unique reviews",
                        truncate_for_display(title, 60),
                        record.reviews.len()
                    );
                }
                sampled += 1;
                record
            }
            Err(e) => {
                warn!("Product {} failed: {}; emitting empty record", seed.asin, e);
                emptied += 1;
                ProductRecord::empty()
            }
        };
        store.append(brand, record)?;
    }

    let stats = coordinator.stats();
    let fetch_stats = fetcher.stats();
    println!();
    println!("Sampling complete for '{}'", brand);
    println!("==================================");
    println!("Products sampled: {} ({} empty)", sampled, emptied);
    println!(
        "Main pages: {} ok, {} failed",
        stats.main_pages_fetched, stats.main_pages_failed
    );
    println!("Buckets sampled: {}", stats.buckets_sampled);
    println!(
        "Reviews kept: {} ({} duplicates removed)",
        stats.reviews_sampled, stats.duplicates_removed
    );
    println!(
        "Page fetches: {} ({} ok, {} failed)",
        fetch_stats.total_fetches, fetch_stats.successes, fetch_stats.failures
    );
    Ok(())
}
