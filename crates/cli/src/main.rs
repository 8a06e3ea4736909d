//! # reviewlens: Review Authenticity from the Command Line
//!
//! This binary is a thin entrypoint. All logic is delegated to the
//! `reviewlens_cli` library crate.

use anyhow::Result;
use clap::Parser;
use reviewlens_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Environment first, so env-backed flags see `.env` values.
    dotenvy::dotenv().ok();

    // 2. Setup logging on stderr; stdout carries the report.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("reviewlens=warn".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 3. Parse CLI arguments
    let cli = Cli::parse();

    // 4. Call the library's run function and handle the final result
    if let Err(e) = run(cli).await {
        eprintln!("[reviewlens error] {e:?}");
        std::process::exit(1);
    }

    Ok(())
}
