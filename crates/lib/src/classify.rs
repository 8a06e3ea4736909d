//! # Classification Batcher
//!
//! Submits a bounded, deterministic prefix of the normalized reviews to the AI
//! provider, one call per review, and reduces each call to a [`Classification`].
//!
//! Every call produces its own [`ReviewOutcome`]; a failed call only ever
//! affects the label of the review it was made for.

use crate::constants::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REVIEW_CAP};
use crate::errors::PromptError;
use crate::prompts::REVIEW_CLASSIFICATION_SYSTEM_PROMPT;
use crate::providers::ai::AiProvider;
use crate::types::{Classification, Label, Review};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Knobs for one classification batch.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Only the first `cap` reviews, in normalized order, are submitted.
    pub cap: usize,
    /// Maximum number of calls in flight at once.
    pub concurrency: usize,
    /// Extra attempts per call on transient transport errors.
    pub max_retries: u32,
    pub system_prompt: String,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            cap: DEFAULT_REVIEW_CAP,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            system_prompt: REVIEW_CLASSIFICATION_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Why a single review could not be given a substantive label.
#[derive(Error, Debug)]
pub enum ClassificationFailure {
    #[error("AI provider call failed: {0}")]
    Provider(#[from] PromptError),
    #[error("Could not read a verdict from response: {0:?}")]
    Unparseable(String),
}

/// The result of classifying one review, before it is reduced to a label.
#[derive(Debug)]
pub struct ReviewOutcome {
    pub review_id: usize,
    pub result: Result<Label, ClassificationFailure>,
}

impl From<ReviewOutcome> for Classification {
    fn from(outcome: ReviewOutcome) -> Self {
        let label = match outcome.result {
            Ok(label) => label,
            Err(e) => {
                warn!(review_id = outcome.review_id, error = %e, "Review left unclassified");
                Label::Unknown
            }
        };
        Classification {
            review_id: outcome.review_id,
            label,
        }
    }
}

/// Maps a free-text verdict onto a label.
///
/// Matching is case-insensitive and ignores whitespace and punctuation around
/// words. The response must mention exactly one of `real` or `fake` as a whole
/// word; anything else, including a response mentioning both, is `Unknown`.
pub fn parse_label(raw: &str) -> Label {
    let lowered = raw.to_lowercase();
    let mut saw_real = false;
    let mut saw_fake = false;
    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        match word {
            "real" => saw_real = true,
            "fake" => saw_fake = true,
            _ => {}
        }
    }
    match (saw_real, saw_fake) {
        (true, false) => Label::Real,
        (false, true) => Label::Fake,
        _ => Label::Unknown,
    }
}

/// Classifies a single review, retrying transient transport failures.
pub async fn classify_review(
    provider: &dyn AiProvider,
    review: &Review,
    system_prompt: &str,
    max_retries: u32,
) -> ReviewOutcome {
    let mut attempt = 0;
    let result = loop {
        match provider.generate(system_prompt, &review.text).await {
            Ok(raw) => {
                break match parse_label(&raw) {
                    Label::Unknown => Err(ClassificationFailure::Unparseable(raw)),
                    label => Ok(label),
                };
            }
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                debug!(review_id = review.id, attempt, error = %e, "Retrying classification call");
            }
            Err(e) => break Err(ClassificationFailure::Provider(e)),
        }
    };
    ReviewOutcome {
        review_id: review.id,
        result,
    }
}

/// Runs one classification call per review for the first `options.cap` reviews.
///
/// Calls may complete in any order; outcomes are returned sorted by `review_id`.
pub async fn classify_outcomes(
    provider: &dyn AiProvider,
    reviews: &[Review],
    options: &ClassifyOptions,
) -> Vec<ReviewOutcome> {
    let selected = &reviews[..reviews.len().min(options.cap)];
    if selected.len() < reviews.len() {
        info!(
            submitted = selected.len(),
            skipped = reviews.len() - selected.len(),
            "Review cap reached"
        );
    }

    let calls: Vec<_> = selected
        .iter()
        .map(|review| {
            classify_review(
                provider,
                review,
                &options.system_prompt,
                options.max_retries,
            )
        })
        .collect();
    let mut outcomes: Vec<ReviewOutcome> = stream::iter(calls)
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    outcomes.sort_by_key(|o| o.review_id);
    outcomes
}

/// Classifies reviews, reducing every failure to [`Label::Unknown`].
///
/// Returns exactly `min(reviews.len(), options.cap)` classifications.
pub async fn classify(
    provider: &dyn AiProvider,
    reviews: &[Review],
    options: &ClassifyOptions,
) -> Vec<Classification> {
    classify_outcomes(provider, reviews, options)
        .await
        .into_iter()
        .map(Classification::from)
        .collect()
}
