use crate::{errors::ExtractionError, types::ProductSnapshot};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for turning a product-page URL into a [`ProductSnapshot`] through an
/// external content-extraction service.
///
/// Implementations must preserve the service's delivery order in
/// `raw_reviews` and must not retry on failure.
#[async_trait]
pub trait Extractor: Send + Sync + Debug + DynClone {
    async fn extract(&self, url: &str) -> Result<ProductSnapshot, ExtractionError>;
}

dyn_clone::clone_trait_object!(Extractor);
