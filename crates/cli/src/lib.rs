//! # `reviewlens` CLI Library Crate
//!
//! One-shot review analysis from the command line. Configuration comes from
//! flags or the matching environment variables; the pipeline is the same one
//! the server runs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use reviewlens::{
    constants::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REVIEW_CAP},
    AnalysisReport, Label,
};
use reviewlens_server::{
    config::{AppConfig, ClassificationConfig, ExtractionConfig},
    state::build_analyzer,
    types::AnalyzeResponse,
};
use std::{fs, path::PathBuf};
use tracing::info;
use uuid::Uuid;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the reviews of a product page as real or fake
    Analyze(AnalyzeArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// The product page URL.
    pub url: String,
    /// Maximum number of reviews to classify.
    #[arg(long, env = "REVIEW_CAP", default_value_t = DEFAULT_REVIEW_CAP)]
    pub cap: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write the report to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// "firecrawl" or "direct".
    #[arg(long, env = "EXTRACTION_STRATEGY", default_value = "firecrawl")]
    pub extraction_strategy: String,
    #[arg(
        long,
        env = "FIRECRAWL_API_URL",
        default_value = "https://api.firecrawl.dev/v1/scrape"
    )]
    pub firecrawl_api_url: String,
    #[arg(long, env = "FIRECRAWL_API_KEY", hide_env_values = true)]
    pub firecrawl_api_key: Option<String>,
    /// Retry a failed Firecrawl fetch with a direct request.
    #[arg(long, env = "DIRECT_FALLBACK")]
    pub direct_fallback: bool,
    /// "gemini" or "local".
    #[arg(long, env = "AI_PROVIDER", default_value = "gemini")]
    pub ai_provider: String,
    #[arg(long, env = "AI_API_URL")]
    pub ai_api_url: Option<String>,
    /// Takes precedence over the provider-specific keys below.
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    pub ai_api_key: Option<String>,
    /// Defaults to gemini-2.0-flash for Gemini.
    #[arg(long, env = "AI_MODEL")]
    pub ai_model: Option<String>,
    // The variables the server's config templates read, so one `.env` serves both.
    #[arg(long, env = "GEMINI_API_KEY", hide = true, hide_env_values = true)]
    pub gemini_api_key: Option<String>,
    #[arg(long, env = "LOCAL_AI_API_URL", hide = true)]
    pub local_ai_api_url: Option<String>,
    #[arg(long, env = "LOCAL_AI_API_KEY", hide = true, hide_env_values = true)]
    pub local_ai_api_key: Option<String>,
    #[arg(long, env = "LOCAL_AI_MODEL", hide = true)]
    pub local_ai_model: Option<String>,
    #[arg(long, env = "CLASSIFY_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
    #[arg(long, env = "CLASSIFY_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
    /// Abandon the analysis after this many seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,
}

impl AnalyzeArgs {
    /// The server configuration equivalent to these arguments.
    pub fn to_app_config(&self) -> AppConfig {
        let (api_url, api_key, model_name) = match self.ai_provider.as_str() {
            "local" => (
                self.ai_api_url.clone().or_else(|| self.local_ai_api_url.clone()),
                self.ai_api_key.clone().or_else(|| self.local_ai_api_key.clone()),
                self.ai_model
                    .clone()
                    .or_else(|| self.local_ai_model.clone())
                    .unwrap_or_default(),
            ),
            _ => (
                self.ai_api_url.clone(),
                self.ai_api_key.clone().or_else(|| self.gemini_api_key.clone()),
                self.ai_model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            ),
        };

        AppConfig {
            review_cap: self.cap,
            request_timeout_secs: self.timeout_secs,
            extraction: ExtractionConfig {
                strategy: self.extraction_strategy.clone(),
                api_url: self.firecrawl_api_url.clone(),
                api_key: self.firecrawl_api_key.clone(),
                direct_fallback: self.direct_fallback,
                ..Default::default()
            },
            classification: ClassificationConfig {
                provider: self.ai_provider.clone(),
                api_url,
                api_key,
                model_name,
                concurrency: self.concurrency,
                max_retries: self.max_retries,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

// --- Public Entrypoint ---

/// The main entry point for the `reviewlens` library.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args).await,
    }
}

// --- Command Handlers ---

async fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    info!(url = %args.url, cap = args.cap, "Starting 'analyze' command");
    let analyzer =
        build_analyzer(&args.to_app_config()).context("Failed to configure the analyzer")?;

    let analysis_id = Uuid::new_v4();
    let report = analyzer
        .run_with_id(analysis_id, &args.url)
        .await
        .with_context(|| format!("Analysis of '{}' failed", args.url))?;

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&AnalyzeResponse {
            analysis_id,
            report,
        })
        .context("Failed to serialize the report")?,
        OutputFormat::Text => format_report_text(&report),
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to '{}'", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Renders a report for humans: a product header, then one block per review.
pub fn format_report_text(report: &AnalysisReport) -> String {
    let mut out = format!(
        "Product: {}\nPrice:   {}\nReviews: {} found, {} analyzed ({} real, {} fake, {} unknown)\n",
        report.product_title,
        report.product_price,
        report.total_found_count,
        report.processed_count,
        report.count_label(Label::Real),
        report.count_label(Label::Fake),
        report.count_label(Label::Unknown),
    );
    let details = &report.product_details;
    if let Some(average) = &details.average_rating {
        match &details.total_ratings {
            Some(total) => out.push_str(&format!("Rating:  {average} ({total})\n")),
            None => out.push_str(&format!("Rating:  {average}\n")),
        }
    }

    for entry in &report.entries {
        let review = &entry.review;
        let rating = review
            .rating
            .map(|r| format!("{r:.1}/5"))
            .unwrap_or_else(|| "-".to_string());
        let verified = match review.verified_purchase {
            Some(true) => "verified",
            Some(false) => "unverified",
            None => "-",
        };
        let label = if entry.analyzed {
            entry.label.to_string()
        } else {
            format!("{} (not analyzed)", entry.label)
        };
        out.push_str(&format!(
            "\n[#{}] {label}\n  {} | {rating} | {} | {verified}\n  {}\n",
            review.id, review.username, review.timestamp, review.text
        ));
    }
    out
}
