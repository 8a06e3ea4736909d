//! # Report Assembler

use crate::types::{AnalysisReport, Classification, Label, ProductSnapshot, ReportEntry, Review};
use std::collections::HashMap;

/// Joins normalized reviews with their classifications on `review_id`.
///
/// Entries follow the order of `normalized`. A review with no classification
/// (beyond the cap, or simply missing) is labelled [`Label::Unknown`] and
/// marked as not analyzed. Pure, no I/O.
pub fn assemble(
    snapshot: ProductSnapshot,
    normalized: Vec<Review>,
    classifications: &[Classification],
) -> AnalysisReport {
    let labels: HashMap<usize, Label> = classifications
        .iter()
        .map(|c| (c.review_id, c.label))
        .collect();

    let total_found_count = normalized.len();
    let entries = normalized
        .into_iter()
        .map(|review| {
            let label = labels.get(&review.id).copied();
            ReportEntry {
                review,
                label: label.unwrap_or(Label::Unknown),
                analyzed: label.is_some(),
            }
        })
        .collect();

    AnalysisReport {
        product_title: snapshot.title,
        product_price: snapshot.price,
        product_details: snapshot.details,
        entries,
        processed_count: classifications.len(),
        total_found_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductDetails;

    fn review(id: usize) -> Review {
        Review {
            id,
            username: format!("user{id}"),
            timestamp: "N/A".to_string(),
            text: format!("review {id}"),
            rating: None,
            verified_purchase: None,
        }
    }

    #[test]
    fn test_assemble_defaults_missing_labels_to_unknown() {
        let snapshot = ProductSnapshot {
            title: "Tray".to_string(),
            price: "₹499".to_string(),
            details: ProductDetails {
                average_rating: Some("4.1 out of 5 stars".to_string()),
                ..Default::default()
            },
            raw_reviews: vec![],
        };
        let normalized = vec![review(0), review(2), review(5)];
        let classifications = vec![
            Classification {
                review_id: 5,
                label: Label::Fake,
            },
            Classification {
                review_id: 0,
                label: Label::Real,
            },
        ];

        let report = assemble(snapshot, normalized, &classifications);

        assert_eq!(report.product_title, "Tray");
        assert_eq!(report.product_price, "₹499");
        assert_eq!(
            report.product_details.average_rating.as_deref(),
            Some("4.1 out of 5 stars")
        );
        assert_eq!(report.total_found_count, 3);
        assert_eq!(report.processed_count, 2);
        let ids: Vec<usize> = report.entries.iter().map(|e| e.review.id).collect();
        assert_eq!(ids, vec![0, 2, 5]);
        assert_eq!(report.entries[0].label, Label::Real);
        assert_eq!(report.entries[1].label, Label::Unknown);
        assert!(!report.entries[1].analyzed);
        assert_eq!(report.entries[2].label, Label::Fake);
    }

    #[test]
    fn test_assemble_empty_review_set() {
        let report = assemble(ProductSnapshot::default(), vec![], &[]);
        assert!(report.entries.is_empty());
        assert_eq!(report.processed_count, 0);
        assert_eq!(report.total_found_count, 0);
    }

    #[test]
    fn test_report_wire_format() {
        let normalized = vec![review(0)];
        let report = assemble(ProductSnapshot::default(), normalized, &[]);

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["product_title"], "N/A");
        assert!(json["product_details"]["features"].as_array().unwrap().is_empty());
        assert_eq!(json["reviews"][0]["text"], "review 0");
        assert_eq!(json["reviews"][0]["classification"], "UNKNOWN");
        assert_eq!(json["reviews"][0]["analyzed"], false);
        assert!(json["reviews"][0]["rating"].is_null());
    }
}
