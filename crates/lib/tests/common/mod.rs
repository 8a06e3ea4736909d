#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the `reviewlens` integration tests. Mock providers live in
//! `reviewlens-test-utils`.

use dotenvy::dotenv;
use reviewlens::{ProductSnapshot, ReviewAnalyzer, ReviewAnalyzerBuilder};
use reviewlens_test_utils::{MockAiProvider, MockExtractor};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builds an analyzer over a fixed snapshot and the given mock AI provider.
pub fn analyzer_for(
    snapshot: ProductSnapshot,
    ai_provider: &MockAiProvider,
    review_cap: usize,
) -> ReviewAnalyzer {
    ReviewAnalyzerBuilder::new()
        .extractor(Box::new(MockExtractor::with_snapshot(snapshot)))
        .ai_provider(Box::new(ai_provider.clone()))
        .review_cap(review_cap)
        .build()
        .expect("analyzer should build with both providers set")
}
