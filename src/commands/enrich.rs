use anyhow::{Context, Result};
use revstrata::{
    config::Config,
    enrich::{summarize_records, tag_records, ChatClient},
    store::OutputStore,
};

/// Annotate a brand's sampled records with summaries and sentiment tags.
pub async fn enrich_brand(
    config: &Config,
    brand: &str,
    summaries: bool,
    sentiments: bool,
) -> Result<()> {
    let store = OutputStore::open(&config.output.results_dir)
        .context("Failed to open results directory")?;

    let mut records = store.load(brand)?;
    if records.is_empty() {
        println!(
            "No records found for '{}'. Run `sample --brand {}` first.",
            brand, brand
        );
        return Ok(());
    }

    let client = ChatClient::new(&config.enrich).context("Failed to create chat client")?;

    if summaries {
        let annotated = summarize_records(&client, &mut records).await;
        println!("Added summaries to {} of {} records", annotated, records.len());
    }
    if sentiments {
        let annotated = tag_records(&client, &mut records).await;
        println!(
            "Added sentiment tags to {} of {} records",
            annotated,
            records.len()
        );
    }

    let path = store.save_all(brand, &records)?;
    println!("Updated {}", path.display());
    Ok(())
}
