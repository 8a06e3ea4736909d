//! # Providers
//!
//! The two external collaborators of the pipeline, each behind a trait:
//! - [`ai::AiProvider`] for the text-classification service.
//! - [`extract::Extractor`] for the content-extraction service.

pub mod ai;
pub mod extract;
