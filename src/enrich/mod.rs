//! Enrichment collaborators
//!
//! Annotates sampled records with a one-sentence summary and per-star
//! aspect sentiment tags, via external text-classification services spoken
//! to over an OpenAI-compatible chat API. Both stages read the brand store,
//! annotate records in place, and the caller writes the store back.

mod client;
mod sentiment;
mod summary;

pub use client::{ChatClient, EnrichError};
pub use sentiment::{parse_sentiment_response, SentimentTagger, ASPECT_VOCABULARY, SENTIMENT_PROMPT};
pub use summary::{join_review_texts, Summarizer, SUMMARY_PROMPT};

use tracing::{info, warn};

use crate::types::ProductRecord;

/// Add summaries to every record; returns how many were annotated.
///
/// A failed service call is logged and that record is skipped; the batch
/// continues.
pub async fn summarize_records(client: &ChatClient, records: &mut [ProductRecord]) -> usize {
    let summarizer = Summarizer::new(client);
    let mut annotated = 0;
    for record in records.iter_mut() {
        match summarizer.summarize(record).await {
            Ok(()) => {
                if let Some(summary) = &record.review_summary {
                    info!("Summary for {:?}: {}", record.product_id, summary);
                    annotated += 1;
                }
            }
            Err(e) => {
                warn!("Summarization failed for {:?}: {}", record.product_id, e);
            }
        }
    }
    annotated
}

/// Add aspect sentiment tags to every record with reviews; returns how many
/// were annotated.
pub async fn tag_records(client: &ChatClient, records: &mut [ProductRecord]) -> usize {
    let tagger = SentimentTagger::new(client);
    let mut annotated = 0;
    for record in records.iter_mut() {
        if record.reviews.is_empty() {
            continue;
        }
        tagger.tag(record).await;
        annotated += 1;
    }
    annotated
}
