//! # Common Test Utilities
//!
//! `TestApp` spawns a real server on a random port. It is configured either
//! through a temporary `config.yml` pointing every outbound call at an
//! `httpmock::MockServer`, or directly with an `AppState` built from mocks.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use reviewlens::ReviewAnalyzer;
use reviewlens_server::{
    config,
    router,
    state::{build_app_state, AppState},
};
use std::{fs::File, io::Write, net::SocketAddr, sync::Arc};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _config_dir: Option<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server from a config file whose extraction (Firecrawl) and
    /// classification (local, OpenAI-compatible) endpoints live on the mock server.
    pub async fn spawn(review_cap: usize) -> Result<Self> {
        let mock_server = MockServer::start_async().await;

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
review_cap: {review_cap}
request_timeout_secs: 10
extraction:
  strategy: "firecrawl"
  api_url: "{}"
  api_key: "fc-test-key"
  timeout_secs: 5
classification:
  provider: "local"
  api_url: "{}"
  api_key: null
  model_name: "mock-chat-model"
  timeout_secs: 5
  concurrency: 2
  max_retries: 0
"#,
            mock_server.url("/v1/scrape"),
            mock_server.url("/v1/chat/completions")
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(&config).await?;

        let mut app = TestApp::spawn_with_state(app_state, mock_server).await?;
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    /// Spawns the server around a ready-made analyzer (usually built from mocks).
    pub async fn spawn_with_analyzer(analyzer: ReviewAnalyzer) -> Result<Self> {
        let app_state = AppState {
            analyzer: Arc::new(analyzer),
        };
        TestApp::spawn_with_state(app_state, MockServer::start_async().await).await
    }

    pub async fn spawn_with_state(app_state: AppState, mock_server: MockServer) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _config_dir: None,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
