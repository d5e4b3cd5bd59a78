use anyhow::{Context, Result};
use revstrata::{
    catalog::CatalogCrawler, config::Config, scraping::RenderClient, store::OutputStore,
};
use tracing::info;

/// Run the catalog discovery crawl for one brand and write its seed file.
pub async fn discover_brand(
    config: &Config,
    brand: &str,
    max_products: Option<usize>,
) -> Result<()> {
    info!("Starting catalog discovery for '{}'", brand);

    let store = OutputStore::open(&config.output.results_dir)
        .context("Failed to open results directory")?;
    let fetcher = RenderClient::new(&config.fetch, &config.credentials)
        .context("Failed to create rendering client")?;
    let crawler = CatalogCrawler::new(&fetcher, &config.catalog);

    let seeds = crawler.discover(brand, max_products).await?;
    let path = store.save_seeds(brand, &seeds)?;

    let stats = fetcher.stats();
    println!("Discovered {} products for '{}'", seeds.len(), brand);
    println!("Seeds saved to {}", path.display());
    println!(
        "Listing fetches: {} ({} ok, {} failed)",
        stats.total_fetches, stats.successes, stats.failures
    );
    Ok(())
}
