//! # Review Authenticity Analysis
//!
//! This crate turns a product-page URL into an authenticity report. It pulls
//! product facts and customer reviews through a configurable extraction
//! provider, asks an AI provider to judge each review as real or fake, and
//! joins the verdicts back onto the reviews in their original order.
//!
//! The pipeline is stateless: every call to [`ReviewAnalyzer::run`] creates
//! its own entities and shares nothing with concurrent runs.

pub mod classify;
pub mod constants;
pub mod errors;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod types;

pub use errors::{ExtractionError, PipelineError, PromptError};
pub use pipeline::{PipelineStage, ReviewAnalyzer, ReviewAnalyzerBuilder};
pub use types::{
    AnalysisReport, Classification, Label, ProductDetails, ProductSnapshot, RawReviewRecord,
    ReportEntry, Review,
};
