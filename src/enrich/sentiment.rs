//! Aspect-based sentiment tagging stage

use serde::Serialize;
use tracing::{debug, warn};

use super::client::ChatClient;
use crate::types::{AspectSentiments, ProductRecord};

/// The controlled vocabulary the collaborator draws aspect tags from
pub const ASPECT_VOCABULARY: &[&str] = &[
    "AUDIO",
    "BATTERY",
    "BUILD_QUALITY",
    "DESIGN",
    "DISPLAY",
    "PERFORMANCE",
    "PORTABILITY",
    "PRICE",
];

/// System prompt for the sentiment collaborator
pub const SENTIMENT_PROMPT: &str = r#"You are an aspect-based sentiment analysis engine. You will be given a JSON array of laptop reviews. Each review object contains at least a "star_rating" (for example, "5.0 out of 5 stars") and a "review_text". Your task is to analyze each review and extract aspect terms from the review text based on its sentiment. Only use the following allowed aspect terms:

AUDIO, BATTERY, BUILD_QUALITY, DESIGN, DISPLAY, PERFORMANCE, PORTABILITY, PRICE

For each review, if the review is positive (indicated by its star rating), extract the positive aspect terms mentioned in the review that match the allowed list. If the review is negative, extract the negative aspect terms. Some reviews may contain mixed sentiments; in that case, only include aspect terms clearly expressed with a positive sentiment in the positive list and vice versa.

After processing all reviews, aggregate the results per star rating into a JSON object with the keys "pos_5_aspects", "neg_5_aspects", "pos_4_aspects", "neg_4_aspects", "pos_3_aspects", "neg_3_aspects", "pos_2_aspects", "neg_2_aspects", "pos_1_aspects" and "neg_1_aspects", each holding the list of unique aspect terms extracted from reviews with that star rating and sentiment.

Return only the JSON object containing these keys and their corresponding arrays. If no aspect terms are found for a particular key, output an empty list for that key. **Do not** include any additional commentary or explanations."#;

/// One review as sent to the collaborator
#[derive(Debug, Serialize)]
struct ReviewPayload<'a> {
    star_rating: &'a str,
    review_text: &'a str,
}

/// Parse a collaborator response into aspect lists.
///
/// Structural parsing only: unknown keys are ignored, missing keys default
/// to empty lists, tag values are taken as-is.
pub fn parse_sentiment_response(response: &str) -> Result<AspectSentiments, serde_json::Error> {
    serde_json::from_str(response.trim())
}

/// Requests aspect tags per review and aggregates them per star rating.
pub struct SentimentTagger<'a> {
    client: &'a ChatClient,
}

impl<'a> SentimentTagger<'a> {
    pub fn new(client: &'a ChatClient) -> Self {
        Self { client }
    }

    /// Tag every review on the record and store the aggregate.
    ///
    /// Reviews without a rating or body are skipped; a failed service call
    /// or an unparsable response drops that review's tags and moves on, so
    /// one bad exchange never loses the rest of the product's tags.
    pub async fn tag(&self, record: &mut ProductRecord) {
        let mut aggregated = AspectSentiments::default();

        for review in &record.reviews {
            if review.star_rating.is_empty() || review.review_text.is_empty() {
                continue;
            }
            let payload = vec![ReviewPayload {
                star_rating: &review.star_rating,
                review_text: &review.review_text,
            }];
            let input = match serde_json::to_string(&payload) {
                Ok(input) => input,
                Err(e) => {
                    warn!("Failed to encode review payload: {}", e);
                    continue;
                }
            };

            let response = match self.client.complete(SENTIMENT_PROMPT, &input).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Sentiment request failed: {}", e);
                    continue;
                }
            };
            match parse_sentiment_response(&response) {
                Ok(tags) => aggregated.merge(tags),
                Err(e) => {
                    debug!("Unparsable sentiment response ({}); skipping review", e);
                }
            }
        }

        aggregated.dedupe();
        record.review_sentiments = Some(aggregated);
    }
}
