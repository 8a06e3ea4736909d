//! # Data Model
//!
//! Every entity here is created fresh for one pipeline run and dropped once the
//! response has been produced.

use crate::constants::NOT_AVAILABLE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One review as delivered by the extraction service. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReviewRecord {
    #[serde(default)]
    pub reviewer_name: Option<String>,
    /// Provider-formatted rating, e.g. `"4.0 out of 5 stars"`.
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub review_title: Option<String>,
    #[serde(default)]
    pub review_text: Option<String>,
    /// Provider-formatted date, e.g. `"Reviewed in India on 3 March 2024"`.
    #[serde(default)]
    pub review_date: Option<String>,
    #[serde(default)]
    pub is_verified_purchase: Option<bool>,
}

/// Secondary product facts, passed through to the report as found on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    /// Rating summary text, e.g. `"4.2 out of 5 stars"`.
    #[serde(default)]
    pub average_rating: Option<String>,
    /// Ratings count text, e.g. `"1,024 ratings"`.
    #[serde(default)]
    pub total_ratings: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Product-level facts extracted from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub title: String,
    /// Kept verbatim, currency symbol included.
    pub price: String,
    #[serde(default)]
    pub details: ProductDetails,
    /// Delivery order of this list is the canonical order of the final report.
    pub raw_reviews: Vec<RawReviewRecord>,
}

impl Default for ProductSnapshot {
    fn default() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            price: NOT_AVAILABLE.to_string(),
            details: ProductDetails::default(),
            raw_reviews: Vec::new(),
        }
    }
}

/// A normalized review, ready for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// 0-based position in `ProductSnapshot::raw_reviews`.
    pub id: usize,
    pub username: String,
    pub timestamp: String,
    /// Never empty.
    pub text: String,
    pub rating: Option<f32>,
    pub verified_purchase: Option<bool>,
}

/// The authenticity verdict for a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Real,
    Fake,
    /// No verdict could be obtained or parsed. Never a stand-in for `Real` or `Fake`.
    Unknown,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
            Label::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// The classification service's verdict for one review, joined on `review_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub review_id: usize,
    pub label: Label,
}

/// A review paired with its label in the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(flatten)]
    pub review: Review,
    #[serde(rename = "classification")]
    pub label: Label,
    /// `false` when the review was never submitted for classification (beyond the cap).
    pub analyzed: bool,
}

/// The pipeline's terminal artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub product_title: String,
    pub product_price: String,
    pub product_details: ProductDetails,
    #[serde(rename = "reviews")]
    pub entries: Vec<ReportEntry>,
    /// Number of reviews submitted for classification, including those that ended `UNKNOWN`.
    pub processed_count: usize,
    /// Number of reviews present after normalization, before the cap.
    pub total_found_count: usize,
}

impl AnalysisReport {
    /// Counts entries carrying the given label.
    pub fn count_label(&self, label: Label) -> usize {
        self.entries.iter().filter(|e| e.label == label).count()
    }
}
