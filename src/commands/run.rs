use anyhow::Result;
use revstrata::config::Config;
use tracing::error;

use super::{discover, enrich, sample};

/// Run the full pipeline (discover, sample, enrich) for each brand.
///
/// A brand that fails at any stage is logged and the next brand still runs.
pub async fn run_pipeline(
    config: &Config,
    brands: Vec<String>,
    max_products: Option<usize>,
    skip_enrich: bool,
) -> Result<()> {
    let brands = if brands.is_empty() {
        config.catalog.brand_filters.keys().cloned().collect()
    } else {
        brands
    };

    for brand in &brands {
        println!("=== Running discovery for '{}' ===", brand);
        if let Err(e) = discover::discover_brand(config, brand, max_products).await {
            error!("Discovery failed for '{}': {:#}", brand, e);
            continue;
        }

        println!("=== Sampling reviews for '{}' ===", brand);
        if let Err(e) = sample::sample_brand(config, brand).await {
            error!("Sampling failed for '{}': {:#}", brand, e);
            continue;
        }

        if !skip_enrich {
            println!("=== Enriching records for '{}' ===", brand);
            if let Err(e) = enrich::enrich_brand(config, brand, true, true).await {
                error!("Enrichment failed for '{}': {:#}", brand, e);
                continue;
            }
        }

        println!("=== Workflow complete for '{}' ===", brand);
    }
    Ok(())
}
