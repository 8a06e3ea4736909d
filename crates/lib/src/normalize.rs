//! # Review Normalizer
//!
//! Maps provider-native [`RawReviewRecord`]s into canonical [`Review`]s. Pure, no I/O.

use crate::constants::NOT_AVAILABLE;
use crate::types::{RawReviewRecord, Review};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static RATING_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\s*(\d+(?:[.,]\d+)?)").ok());

/// Normalizes raw review records, dropping those without text.
///
/// `Review::id` is the record's position in `raw`, so ids may have gaps where
/// records were dropped. Relative order is preserved.
pub fn normalize(raw: &[RawReviewRecord]) -> Vec<Review> {
    let reviews: Vec<Review> = raw
        .iter()
        .enumerate()
        .filter_map(|(id, record)| normalize_record(id, record))
        .collect();

    let dropped = raw.len() - reviews.len();
    if dropped > 0 {
        debug!(dropped, kept = reviews.len(), "Dropped reviews without text");
    }
    reviews
}

fn normalize_record(id: usize, record: &RawReviewRecord) -> Option<Review> {
    let text = record.review_text.as_deref().map(str::trim).unwrap_or("");
    if text.is_empty() {
        return None;
    }

    Some(Review {
        id,
        username: non_empty_or_sentinel(record.reviewer_name.as_deref()),
        timestamp: record
            .review_date
            .as_deref()
            .map(extract_date)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        text: text.to_string(),
        rating: record.rating.as_deref().and_then(parse_rating),
        verified_purchase: record.is_verified_purchase,
    })
}

fn non_empty_or_sentinel(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Strips a "Reviewed in <place> on " prefix, keeping the date text verbatim.
pub fn extract_date(raw: &str) -> String {
    let raw = raw.trim();
    match raw.rfind(" on ") {
        Some(pos) => raw[pos + " on ".len()..].trim().to_string(),
        None => raw.to_string(),
    }
}

/// Reads the leading number of a rating such as `"4.0 out of 5 stars"`.
pub fn parse_rating(raw: &str) -> Option<f32> {
    let re = RATING_RE.as_ref()?;
    let number = re.captures(raw)?.get(1)?.as_str().replace(',', ".");
    number.parse().ok()
}
