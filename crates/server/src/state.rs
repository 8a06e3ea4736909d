//! # Application State
//!
//! The shared state handed to every request handler, and the logic that builds
//! it from [`AppConfig`] at startup.

use crate::config::{AppConfig, ClassificationConfig, ExtractionConfig};
use reviewlens::{
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    ReviewAnalyzer, ReviewAnalyzerBuilder,
};
use reviewlens_web::{ExtractionStrategy, PageExtractor};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Stateless; one analyzer serves every request.
    pub analyzer: Arc<ReviewAnalyzer>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// Instantiates the AI provider named by the classification config.
pub fn build_ai_provider(config: &ClassificationConfig) -> anyhow::Result<Box<dyn AiProvider>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = non_empty(&config.api_key)
                .ok_or_else(|| anyhow::anyhow!("api_key is required for the gemini provider"))?;
            // If api_url is not provided in config, construct it from the model name.
            let api_url = non_empty(&config.api_url)
                .unwrap_or_else(|| GeminiProvider::model_url(&config.model_name));
            Box::new(GeminiProvider::new(api_url, api_key, timeout)?)
        }
        "local" => {
            let api_url = non_empty(&config.api_url).ok_or_else(|| {
                anyhow::anyhow!(
                    "api_url is required for the local provider. Please set LOCAL_AI_API_URL in your .env file."
                )
            })?;
            let model = Some(config.model_name.trim().to_string()).filter(|m| !m.is_empty());
            Box::new(LocalAiProvider::new(
                api_url,
                non_empty(&config.api_key),
                model,
                timeout,
            )?)
        }
        other => {
            return Err(anyhow::anyhow!("Unsupported AI provider type '{other}'"));
        }
    };
    Ok(provider)
}

/// Instantiates the page extractor named by the extraction config.
pub fn build_extractor(config: &ExtractionConfig) -> anyhow::Result<PageExtractor> {
    let strategy = match config.strategy.as_str() {
        "direct" => ExtractionStrategy::Direct,
        "firecrawl" => match non_empty(&config.api_key) {
            Some(api_key) => ExtractionStrategy::Firecrawl {
                api_url: config.api_url.clone(),
                api_key,
            },
            None => {
                warn!("No Firecrawl api_key configured. Pages will be fetched directly.");
                ExtractionStrategy::Direct
            }
        },
        other => {
            return Err(anyhow::anyhow!("Unsupported extraction strategy '{other}'"));
        }
    };
    let direct = matches!(strategy, ExtractionStrategy::Direct);
    info!(
        strategy = %config.strategy,
        direct,
        "Extraction strategy selected"
    );
    Ok(
        PageExtractor::new(strategy, Duration::from_secs(config.timeout_secs))?
            .with_direct_fallback(config.direct_fallback),
    )
}

/// Builds the analyzer from the full configuration.
pub fn build_analyzer(config: &AppConfig) -> anyhow::Result<ReviewAnalyzer> {
    let mut builder = ReviewAnalyzerBuilder::new()
        .extractor(Box::new(build_extractor(&config.extraction)?))
        .ai_provider(build_ai_provider(&config.classification)?)
        .review_cap(config.review_cap)
        .concurrency(config.classification.concurrency)
        .max_retries(config.classification.max_retries)
        .timeout(Duration::from_secs(config.request_timeout_secs));
    if let Some(system_prompt) = non_empty(&config.classification.system_prompt) {
        builder = builder.system_prompt(system_prompt);
    }
    Ok(builder.build()?)
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    Ok(AppState {
        analyzer: Arc::new(build_analyzer(config)?),
    })
}
