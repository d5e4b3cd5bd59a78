//! Rating-histogram analysis and quota derivation
//!
//! The histogram is a list element whose anchors carry accessible labels of
//! the form `"<N> stars represent <P>%"`; each anchor's `href` is the
//! bucket-filtered review URL. Buckets with absent or unparsable labels are
//! omitted rather than failing the parse.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::types::StarRating;

/// One star-rating stratum discovered in the histogram.
#[derive(Debug, Clone)]
pub struct RatingBucket {
    /// The stratum
    pub stars: StarRating,
    /// Share of all reviews in this bucket, 0-100
    pub percentage: u8,
    /// Reviews to sample from this bucket; derived once per product run
    pub quota: u32,
    /// Bucket-filtered review URL, resolved against the page base URL.
    /// None when the histogram entry carried no link.
    pub url: Option<Url>,
}

impl RatingBucket {
    /// Percentage as serialized in the output record, e.g. "70%".
    pub fn percentage_label(&self) -> String {
        format!("{}%", self.percentage)
    }
}

/// Sampling quota for a histogram percentage: `round(percentage / 10)`,
/// half away from zero. 66% -> 7, 64% -> 6, 0% -> 0.
pub fn quota_for(percentage: u8) -> u32 {
    (f64::from(percentage) / 10.0).round() as u32
}

/// Parses the rating-distribution element out of page markup.
pub struct HistogramAnalyzer {
    rows: Selector,
    anchor: Selector,
    label: Regex,
}

impl Default for HistogramAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramAnalyzer {
    pub fn new() -> Self {
        // Both patterns are literals; parse failures are impossible.
        let rows = Selector::parse("ul#histogramTable li").expect("valid selector");
        let anchor = Selector::parse("a").expect("valid selector");
        let label = Regex::new(r"(\d+)\s+stars represent (\d+)%").expect("valid regex");
        Self { rows, anchor, label }
    }

    /// Extract the rating buckets present in `markup`, in document order.
    ///
    /// The markup may be several concatenated pages; only the first entry
    /// per star level is kept. An absent histogram yields an empty vec:
    /// a partial-success path, not a failure.
    pub fn parse(&self, markup: &str, base_url: &Url) -> Vec<RatingBucket> {
        let document = Html::parse_document(markup);
        let mut seen: HashSet<StarRating> = HashSet::new();
        let mut buckets = Vec::new();

        for row in document.select(&self.rows) {
            let Some(anchor) = row.select(&self.anchor).next() else {
                continue;
            };
            let Some(label) = anchor.value().attr("aria-label") else {
                continue;
            };
            let Some(caps) = self.label.captures(label) else {
                continue;
            };
            // Capture groups are \d+; a parse failure just means the label
            // is out of range, so the bucket is omitted like any other gap.
            let Some(stars) = caps[1]
                .parse::<u8>()
                .ok()
                .and_then(StarRating::from_stars)
            else {
                continue;
            };
            let Some(percentage) = caps[2].parse::<u8>().ok().filter(|p| *p <= 100) else {
                continue;
            };
            if !seen.insert(stars) {
                continue;
            }

            let url = anchor
                .value()
                .attr("href")
                .and_then(|href| base_url.join(href).ok());
            let quota = quota_for(percentage);
            debug!(
                "{}: {}% of reviews, quota {}",
                stars, percentage, quota
            );
            buckets.push(RatingBucket {
                stars,
                percentage,
                quota,
                url,
            });
        }

        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.amazon.com/dp/product-reviews/B0TEST/").unwrap()
    }

    fn histogram_markup() -> &'static str {
        r##"
        <html><body>
        <ul id="histogramTable">
          <li><a aria-label="5 stars represent 66% of rating" href="/r?filterByStar=five_star">5 star</a></li>
          <li><a aria-label="4 stars represent 20% of rating" href="/r?filterByStar=four_star">4 star</a></li>
          <li><a aria-label="3 stars represent 0% of rating" href="/r?filterByStar=three_star">3 star</a></li>
          <li><a aria-label="2 stars represent 64% of rating" href="/r?filterByStar=two_star">2 star</a></li>
          <li><a href="/r?filterByStar=one_star">1 star</a></li>
        </ul>
        </body></html>
        "##
    }

    #[test]
    fn quota_rounds_half_away_from_zero() {
        assert_eq!(quota_for(66), 7);
        assert_eq!(quota_for(64), 6);
        assert_eq!(quota_for(0), 0);
        assert_eq!(quota_for(100), 10);
        assert_eq!(quota_for(4), 0);
        assert_eq!(quota_for(5), 1);
    }

    #[test]
    fn parses_buckets_in_document_order() {
        let buckets = HistogramAnalyzer::new().parse(histogram_markup(), &base());
        let stars: Vec<u8> = buckets.iter().map(|b| b.stars.stars()).collect();
        // The 1-star row has no aria-label and is omitted
        assert_eq!(stars, vec![5, 4, 3, 2]);
        assert_eq!(buckets[0].quota, 7);
        assert_eq!(buckets[1].quota, 2);
        assert_eq!(buckets[2].quota, 0);
        assert_eq!(buckets[3].quota, 6);
    }

    #[test]
    fn bucket_urls_resolve_against_base() {
        let buckets = HistogramAnalyzer::new().parse(histogram_markup(), &base());
        let url = buckets[0].url.as_ref().unwrap();
        assert_eq!(url.as_str(), "https://www.amazon.com/r?filterByStar=five_star");
    }

    #[test]
    fn missing_histogram_yields_no_buckets() {
        let buckets =
            HistogramAnalyzer::new().parse("<html><body><p>no reviews</p></body></html>", &base());
        assert!(buckets.is_empty());
    }

    #[test]
    fn repeated_histogram_keeps_first_entry_per_star() {
        let markup = format!("{}{}", histogram_markup(), histogram_markup());
        let buckets = HistogramAnalyzer::new().parse(&markup, &base());
        assert_eq!(buckets.len(), 4);
    }

    #[test]
    fn out_of_range_percentage_is_omitted() {
        let markup = r##"
        <ul id="histogramTable">
          <li><a aria-label="5 stars represent 700% of rating" href="/r">5</a></li>
          <li><a aria-label="4 stars represent 30% of rating" href="/r">4</a></li>
        </ul>
        "##;
        let buckets = HistogramAnalyzer::new().parse(markup, &base());
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].stars.stars(), 4);
    }
}
