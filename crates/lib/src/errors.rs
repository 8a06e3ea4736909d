use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to a classification (AI) provider.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned status {status}: {body}")]
    AiApi { status: u16, body: String },
    #[error("AI provider returned an empty response")]
    EmptyResponse,
    #[error("AI provider refused to answer: {0}")]
    Blocked(String),
    #[error("AI provider ran out of output tokens before answering")]
    TokenLimit,
}

impl PromptError {
    /// Whether a second attempt at the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PromptError::AiRequest(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            PromptError::AiApi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised by an extraction adapter. Any of these is fatal to a pipeline run.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No product URL was provided")]
    EmptyUrl,
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to reach the extraction service for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Extraction service returned status {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Extraction service reported a failure: {0}")]
    Service(String),
    #[error("Extraction service returned an unusable body: {0}")]
    MalformedBody(String),
    #[error("Could not extract any product information or reviews from {0}")]
    NothingExtracted(String),
}

/// Errors that cross the pipeline boundary.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Analysis did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("Pipeline is missing an extraction provider")]
    MissingExtractor,
    #[error("Pipeline is missing an AI provider")]
    MissingAiProvider,
    #[error("Review cap must be at least 1")]
    InvalidCap,
}
