//! Core data types shared across the pipeline

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One star-rating stratum (1-5) used to stratify review sampling.
///
/// A closed enum rather than an open string key so the five-bucket invariant
/// is visible to the compiler. Serializes as `"1_star"`..`"5_star"` to match
/// the output JSON contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StarRating {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl StarRating {
    /// All buckets, lowest first.
    pub const ALL: [StarRating; 5] = [
        StarRating::One,
        StarRating::Two,
        StarRating::Three,
        StarRating::Four,
        StarRating::Five,
    ];

    /// Build from a star count parsed out of page markup.
    pub fn from_stars(stars: u8) -> Option<Self> {
        match stars {
            1 => Some(StarRating::One),
            2 => Some(StarRating::Two),
            3 => Some(StarRating::Three),
            4 => Some(StarRating::Four),
            5 => Some(StarRating::Five),
            _ => None,
        }
    }

    /// Star count, 1-5.
    pub fn stars(self) -> u8 {
        match self {
            StarRating::One => 1,
            StarRating::Two => 2,
            StarRating::Three => 3,
            StarRating::Four => 4,
            StarRating::Five => 5,
        }
    }

    /// JSON object key for this bucket (`"5_star"`).
    pub fn key(self) -> &'static str {
        match self {
            StarRating::One => "1_star",
            StarRating::Two => "2_star",
            StarRating::Three => "3_star",
            StarRating::Four => "4_star",
            StarRating::Five => "5_star",
        }
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for StarRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for StarRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let stars = s
            .strip_suffix("_star")
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(StarRating::from_stars);
        stars.ok_or_else(|| de::Error::custom(format!("invalid star rating key: {}", s)))
    }
}

/// A single customer review parsed from a bucket page.
///
/// Immutable once parsed; `review_text` is the deduplication key and is
/// always non-empty (nodes without body text are skipped at parse time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Reviewer display name (may be empty if the profile node is missing)
    #[serde(default)]
    pub reviewer_name: String,
    /// Star-rating label as shown on the page, e.g. "4.0 out of 5 stars"
    #[serde(default)]
    pub star_rating: String,
    /// Review date label (may be empty)
    #[serde(default)]
    pub review_date: String,
    /// Review body text, non-empty
    pub review_text: String,
}

/// Consolidated output record for one product: metadata, histogram, quotas,
/// and the deduplicated review sample.
///
/// Every field is optional or defaultable so a failed product run serializes
/// as `{}`; the batch driver appends an empty record rather than aborting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<String>,
    /// Percentage label per bucket, e.g. "5_star" -> "70%"
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub histogram: BTreeMap<StarRating, String>,
    /// Sampling quota per bucket derived from the histogram
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quotas: BTreeMap<StarRating, u32>,
    /// Deduplicated reviews in bucket-then-page-then-node order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<ReviewRecord>,
    /// One-sentence summary added by the summarization collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_summary: Option<String>,
    /// Aspect tags added by the sentiment collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_sentiments: Option<AspectSentiments>,
}

impl ProductRecord {
    /// The record emitted when a product run fails entirely.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if this record carries no data at all (a failed run's output).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Total quota across all buckets.
    pub fn quota_total(&self) -> u32 {
        self.quotas.values().sum()
    }
}

/// One product entry produced by the catalog discovery crawl and consumed
/// as a seed by the review sampling core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSeed {
    /// Catalog identifier (ASIN)
    pub asin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
}

impl ProductSeed {
    pub fn new(asin: impl Into<String>) -> Self {
        Self {
            asin: asin.into(),
            price: None,
            image_url: None,
            product_url: None,
        }
    }

    /// A seed without an identifier cannot be sampled.
    pub fn is_valid(&self) -> bool {
        !self.asin.trim().is_empty()
    }
}

/// Aspect tags aggregated per `{positive,negative} x {1..5 stars}`, as
/// returned by the sentiment collaborator. Parsed structurally only; the
/// tag values themselves are not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectSentiments {
    #[serde(default)]
    pub pos_5_aspects: Vec<String>,
    #[serde(default)]
    pub neg_5_aspects: Vec<String>,
    #[serde(default)]
    pub pos_4_aspects: Vec<String>,
    #[serde(default)]
    pub neg_4_aspects: Vec<String>,
    #[serde(default)]
    pub pos_3_aspects: Vec<String>,
    #[serde(default)]
    pub neg_3_aspects: Vec<String>,
    #[serde(default)]
    pub pos_2_aspects: Vec<String>,
    #[serde(default)]
    pub neg_2_aspects: Vec<String>,
    #[serde(default)]
    pub pos_1_aspects: Vec<String>,
    #[serde(default)]
    pub neg_1_aspects: Vec<String>,
}

impl AspectSentiments {
    fn lists_mut(&mut self) -> [&mut Vec<String>; 10] {
        [
            &mut self.pos_5_aspects,
            &mut self.neg_5_aspects,
            &mut self.pos_4_aspects,
            &mut self.neg_4_aspects,
            &mut self.pos_3_aspects,
            &mut self.neg_3_aspects,
            &mut self.pos_2_aspects,
            &mut self.neg_2_aspects,
            &mut self.pos_1_aspects,
            &mut self.neg_1_aspects,
        ]
    }

    /// Append another result's tags onto this one, list by list.
    pub fn merge(&mut self, other: AspectSentiments) {
        let AspectSentiments {
            pos_5_aspects,
            neg_5_aspects,
            pos_4_aspects,
            neg_4_aspects,
            pos_3_aspects,
            neg_3_aspects,
            pos_2_aspects,
            neg_2_aspects,
            pos_1_aspects,
            neg_1_aspects,
        } = other;
        self.pos_5_aspects.extend(pos_5_aspects);
        self.neg_5_aspects.extend(neg_5_aspects);
        self.pos_4_aspects.extend(pos_4_aspects);
        self.neg_4_aspects.extend(neg_4_aspects);
        self.pos_3_aspects.extend(pos_3_aspects);
        self.neg_3_aspects.extend(neg_3_aspects);
        self.pos_2_aspects.extend(pos_2_aspects);
        self.neg_2_aspects.extend(neg_2_aspects);
        self.pos_1_aspects.extend(pos_1_aspects);
        self.neg_1_aspects.extend(neg_1_aspects);
    }

    /// Drop repeated tags within each list, preserving first-seen order.
    pub fn dedupe(&mut self) {
        for list in self.lists_mut() {
            let mut seen = std::collections::HashSet::new();
            list.retain(|tag| seen.insert(tag.clone()));
        }
    }
}
