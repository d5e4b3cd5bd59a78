//! Review deduplication
//!
//! Bucket filters can overlap, so the same review may be reachable from
//! more than one bucket URL. Equality is the exact body text; the first
//! occurrence wins and order is preserved.

use std::collections::HashSet;

use crate::types::ReviewRecord;

/// Remove reviews whose body text has already been seen, preserving
/// first-occurrence order. Pure function, idempotent.
pub fn dedupe_reviews(reviews: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(reviews.len());
    let mut unique = Vec::with_capacity(reviews.len());
    for review in reviews {
        if seen.insert(review.review_text.clone()) {
            unique.push(review);
        }
    }
    unique
}
