//! Thin entrypoint; everything lives in the `reviewlens_server` library.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    reviewlens_server::start().await
}
