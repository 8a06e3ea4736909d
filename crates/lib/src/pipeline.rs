//! # Pipeline Orchestrator
//!
//! [`ReviewAnalyzer`] is the single entry point of the library. A run moves
//! through the stages of [`PipelineStage`]:
//!
//! `Idle → Extracting → Normalizing → Classifying → Assembling → Done`
//!
//! Only `Extracting` can fail. Normalizing, classifying and assembling are
//! total over their inputs, so once a snapshot is in hand the run always ends
//! with a report (possibly with zero entries).

use crate::classify::{classify, ClassifyOptions};
use crate::constants::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REVIEW_CAP};
use crate::errors::{ExtractionError, PipelineError};
use crate::normalize::normalize;
use crate::prompts::REVIEW_CLASSIFICATION_SYSTEM_PROMPT;
use crate::providers::{ai::AiProvider, extract::Extractor};
use crate::report::assemble;
use crate::types::{AnalysisReport, Label, ProductSnapshot};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// The lifecycle of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Extracting,
    Normalizing,
    Classifying,
    Assembling,
    Done,
    Failed,
}

impl PipelineStage {
    /// The next stage on the success path. Terminal stages stay put.
    pub fn next(self) -> Self {
        match self {
            PipelineStage::Idle => PipelineStage::Extracting,
            PipelineStage::Extracting => PipelineStage::Normalizing,
            PipelineStage::Normalizing => PipelineStage::Classifying,
            PipelineStage::Classifying => PipelineStage::Assembling,
            PipelineStage::Assembling => PipelineStage::Done,
            PipelineStage::Done => PipelineStage::Done,
            PipelineStage::Failed => PipelineStage::Failed,
        }
    }

    /// `Failed` is only reachable from `Extracting`.
    pub fn can_fail(self) -> bool {
        self == PipelineStage::Extracting
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn advance(stage: &mut PipelineStage) {
    let next = stage.next();
    debug!(from = %stage, to = %next, "Pipeline stage");
    *stage = next;
}

/// Turns a product URL into an [`AnalysisReport`].
///
/// Holds no per-request state; one analyzer serves any number of concurrent runs.
#[derive(Debug, Clone)]
pub struct ReviewAnalyzer {
    pub(crate) extractor: Box<dyn Extractor>,
    pub(crate) ai_provider: Box<dyn AiProvider>,
    pub(crate) classify_options: ClassifyOptions,
    pub(crate) timeout: Option<Duration>,
}

impl ReviewAnalyzer {
    /// The classification settings every run uses.
    pub fn classify_options(&self) -> &ClassifyOptions {
        &self.classify_options
    }

    /// Runs the pipeline under a freshly generated analysis id.
    pub async fn run(&self, url: &str) -> Result<AnalysisReport, PipelineError> {
        self.run_with_id(Uuid::new_v4(), url).await
    }

    /// Runs the pipeline, tagging every log line with `analysis_id`.
    ///
    /// If a timeout is configured and expires, all in-flight calls are dropped
    /// and no partial report is returned.
    pub async fn run_with_id(
        &self,
        analysis_id: Uuid,
        url: &str,
    ) -> Result<AnalysisReport, PipelineError> {
        let span = info_span!("analysis", %analysis_id, url = %url);
        let run = self.execute(url).instrument(span);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| PipelineError::TimedOut(limit))?,
            None => run.await,
        }
    }

    async fn execute(&self, url: &str) -> Result<AnalysisReport, PipelineError> {
        let mut stage = PipelineStage::Idle;

        advance(&mut stage);
        let snapshot = match self.extract(url).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(from = %stage, to = %PipelineStage::Failed, "Pipeline stage");
                return Err(e.into());
            }
        };
        info!(
            title = %snapshot.title,
            raw_reviews = snapshot.raw_reviews.len(),
            "Extracted product snapshot"
        );

        advance(&mut stage);
        let normalized = normalize(&snapshot.raw_reviews);

        advance(&mut stage);
        let classifications =
            classify(self.ai_provider.as_ref(), &normalized, &self.classify_options).await;

        advance(&mut stage);
        let report = assemble(snapshot, normalized, &classifications);

        advance(&mut stage);
        info!(
            total_found = report.total_found_count,
            processed = report.processed_count,
            fake = report.count_label(Label::Fake),
            unknown = report.count_label(Label::Unknown),
            "Analysis complete"
        );
        Ok(report)
    }

    async fn extract(&self, url: &str) -> Result<ProductSnapshot, ExtractionError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ExtractionError::EmptyUrl);
        }
        self.extractor.extract(url).await
    }
}

/// A builder for creating [`ReviewAnalyzer`] instances.
pub struct ReviewAnalyzerBuilder {
    extractor: Option<Box<dyn Extractor>>,
    ai_provider: Option<Box<dyn AiProvider>>,
    review_cap: usize,
    concurrency: usize,
    max_retries: u32,
    system_prompt: Option<String>,
    timeout: Option<Duration>,
}

impl Default for ReviewAnalyzerBuilder {
    fn default() -> Self {
        Self {
            extractor: None,
            ai_provider: None,
            review_cap: DEFAULT_REVIEW_CAP,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            system_prompt: None,
            timeout: None,
        }
    }
}

impl ReviewAnalyzerBuilder {
    /// Creates a new `ReviewAnalyzerBuilder`.
    ///
    /// # Examples
    ///
    /// ```
    /// use reviewlens::ReviewAnalyzerBuilder;
    ///
    /// let builder = ReviewAnalyzerBuilder::new().review_cap(20);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extraction provider.
    pub fn extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Sets the classification provider.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Sets the maximum number of reviews submitted for classification.
    pub fn review_cap(mut self, review_cap: usize) -> Self {
        self.review_cap = review_cap;
        self
    }

    /// Sets how many classification calls may be in flight at once.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the number of retries for a classification call on transient errors.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Overrides the classification system prompt.
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Bounds the duration of a whole run.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `ReviewAnalyzer`.
    pub fn build(self) -> Result<ReviewAnalyzer, PipelineError> {
        let extractor = self.extractor.ok_or(PipelineError::MissingExtractor)?;
        let ai_provider = self.ai_provider.ok_or(PipelineError::MissingAiProvider)?;
        if self.review_cap == 0 {
            return Err(PipelineError::InvalidCap);
        }

        Ok(ReviewAnalyzer {
            extractor,
            ai_provider,
            classify_options: ClassifyOptions {
                cap: self.review_cap,
                concurrency: self.concurrency.max(1),
                max_retries: self.max_retries,
                system_prompt: self
                    .system_prompt
                    .unwrap_or_else(|| REVIEW_CLASSIFICATION_SYSTEM_PROMPT.to_string()),
            },
            timeout: self.timeout,
        })
    }
}
