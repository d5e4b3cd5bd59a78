//! Review summarization stage

use tracing::debug;

use super::client::{ChatClient, EnrichError};
use crate::types::ProductRecord;

/// System prompt for the summarization collaborator
pub const SUMMARY_PROMPT: &str = "You will be given a string of laptop product reviews. \
Each review is separated by a semicolon \";\". Your task is to summarise the reviews and \
provide a summary of the reviews. Your summary must be concise and within **1 sentence**, \
start your summary with \"The laptop ...\". You do not need to mention the laptop model \
name in the summary. **Only** return the summary of the reviews.";

/// Join a record's review texts into the collaborator's input format.
pub fn join_review_texts(record: &ProductRecord) -> String {
    record
        .reviews
        .iter()
        .map(|review| review.review_text.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Requests one-sentence summaries from the summarization collaborator.
pub struct Summarizer<'a> {
    client: &'a ChatClient,
}

impl<'a> Summarizer<'a> {
    pub fn new(client: &'a ChatClient) -> Self {
        Self { client }
    }

    /// Summarize a record's reviews and store the result on the record.
    ///
    /// Records without reviews (failed or degraded runs) are left untouched.
    pub async fn summarize(&self, record: &mut ProductRecord) -> Result<(), EnrichError> {
        if record.reviews.is_empty() {
            debug!(
                "No reviews to summarize for {:?}; skipping",
                record.product_id
            );
            return Ok(());
        }
        let joined = join_review_texts(record);
        let summary = self.client.complete(SUMMARY_PROMPT, &joined).await?;
        record.review_summary = Some(summary.trim().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewRecord;

    #[test]
    fn joins_review_texts_with_semicolons() {
        let mut record = ProductRecord::empty();
        for text in ["great battery", "poor screen"] {
            record.reviews.push(ReviewRecord {
                reviewer_name: String::new(),
                star_rating: String::new(),
                review_date: String::new(),
                review_text: text.to_string(),
            });
        }
        assert_eq!(join_review_texts(&record), "great battery; poor screen");
    }

    #[test]
    fn empty_record_joins_to_empty_string() {
        assert_eq!(join_review_texts(&ProductRecord::empty()), "");
    }
}
