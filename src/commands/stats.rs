use anyhow::{Context, Result};
use revstrata::{config::Config, store::OutputStore};

/// Show what each brand's store has accumulated.
pub async fn show_stats(config: &Config, brand: Option<String>) -> Result<()> {
    let store = OutputStore::open(&config.output.results_dir)
        .context("Failed to open results directory")?;

    let brands: Vec<String> = match brand {
        Some(brand) => vec![brand],
        None => config.catalog.brand_filters.keys().cloned().collect(),
    };

    println!("Store: {}", config.output.results_dir.display());
    println!("=================================");
    for brand in &brands {
        let seeds = store.load_seeds(brand)?;
        let records = store.load(brand)?;
        let empty = records.iter().filter(|r| r.is_empty()).count();
        let reviews: usize = records.iter().map(|r| r.reviews.len()).sum();
        let summarized = records.iter().filter(|r| r.review_summary.is_some()).count();
        let tagged = records
            .iter()
            .filter(|r| r.review_sentiments.is_some())
            .count();

        println!(
            "{}: {} seeds, {} records ({} empty), {} reviews, {} summarized, {} tagged",
            brand,
            seeds.len(),
            records.len(),
            empty,
            reviews,
            summarized,
            tagged
        );
    }
    Ok(())
}
