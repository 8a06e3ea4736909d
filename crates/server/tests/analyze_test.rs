//! # Analysis Endpoint Tests
//!
//! Full runs through `/api/analyze` and `/analyze_reviews`. The config-driven
//! harness mocks the scrape API and the chat-completions API over HTTP; the
//! remaining tests plug mock providers straight into the analyzer.

mod common;

use anyhow::Result;
use common::TestApp;
use httpmock::Method::POST;
use reviewlens::ReviewAnalyzerBuilder;
use reviewlens_test_utils::{
    fixtures::{product_page_html, snapshot_with_texts, ReviewFixture},
    MockAiProvider, MockExtractor, MockReply,
};
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

const PRODUCT_URL: &str = "https://shop.example/item/42";

fn chat_reply(content: &str) -> Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
}

#[tokio::test]
async fn test_analyze_json_end_to_end() -> Result<()> {
    // --- 1. Arrange ---
    let app = TestApp::spawn(2).await?;
    let html = product_page_html(
        "Acacia Wood Serving Tray",
        &[
            ReviewFixture::new("Asha", "Beautiful grain and sturdy handles."),
            ReviewFixture::new("Ravi", "Best product ever!!! Five stars!!!"),
            ReviewFixture::new("Mei", "Arrived late but works."),
        ],
    );
    let scrape_mock = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/scrape")
                .header("authorization", "Bearer fc-test-key")
                .body_contains(PRODUCT_URL);
            then.status(200)
                .json_body(json!({ "success": true, "data": { "html": html } }));
        })
        .await;
    let real_mock = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Beautiful grain");
            then.status(200).json_body(chat_reply("Real"));
        })
        .await;
    let fake_mock = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Best product ever");
            then.status(200).json_body(chat_reply(" fake. "));
        })
        .await;

    // --- 2. Act ---
    let response = app
        .client
        .post(format!("{}/api/analyze", app.address))
        .json(&json!({ "product_url": PRODUCT_URL }))
        .send()
        .await?;

    // --- 3. Assert ---
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert!(Uuid::parse_str(body["analysis_id"].as_str().unwrap()).is_ok());
    assert_eq!(body["product_title"], "Acacia Wood Serving Tray");
    assert_eq!(body["product_price"], "₹1,299.00");
    assert_eq!(body["total_found_count"], 3);
    assert_eq!(body["processed_count"], 2);

    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews[0]["username"], "Asha");
    assert_eq!(reviews[0]["timestamp"], "3 March 2024");
    assert_eq!(reviews[0]["rating"], 5.0);
    assert_eq!(reviews[0]["verified_purchase"], true);
    assert_eq!(reviews[0]["classification"], "REAL");
    assert_eq!(reviews[1]["classification"], "FAKE");
    assert_eq!(reviews[2]["id"], 2);
    assert_eq!(reviews[2]["classification"], "UNKNOWN");
    assert_eq!(reviews[2]["analyzed"], false);

    scrape_mock.assert_async().await;
    real_mock.assert_hits_async(1).await;
    fake_mock.assert_hits_async(1).await;

    Ok(())
}

#[tokio::test]
async fn test_failed_classification_call_stays_isolated() -> Result<()> {
    let app = TestApp::spawn(50).await?;
    let html = product_page_html(
        "Lamp",
        &[
            ReviewFixture::new("A", "Warm light, good value."),
            ReviewFixture::new("B", "Provider will fail on this one."),
        ],
    );
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/scrape");
            then.status(200)
                .json_body(json!({ "success": true, "data": { "html": html } }));
        })
        .await;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Warm light");
            then.status(200).json_body(chat_reply("real"));
        })
        .await;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Provider will fail");
            then.status(500).body("model crashed");
        })
        .await;

    let response = app
        .client
        .post(format!("{}/api/analyze", app.address))
        .json(&json!({ "product_url": PRODUCT_URL }))
        .send()
        .await?;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["processed_count"], 2);
    assert_eq!(body["reviews"][0]["classification"], "REAL");
    assert_eq!(body["reviews"][1]["classification"], "UNKNOWN");
    assert_eq!(body["reviews"][1]["analyzed"], true);

    Ok(())
}

#[tokio::test]
async fn test_extraction_service_failure_is_bad_gateway() -> Result<()> {
    let app = TestApp::spawn(50).await?;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/scrape");
            then.status(500).body("scraper down");
        })
        .await;
    let chat_mock = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(chat_reply("real"));
        })
        .await;

    let response = app
        .client
        .post(format!("{}/api/analyze", app.address))
        .json(&json!({ "product_url": PRODUCT_URL }))
        .send()
        .await?;

    assert_eq!(502, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Failed to retrieve the product page");
    assert!(body["details"].as_str().unwrap().contains("500"));
    assert!(body.get("reviews").is_none());
    chat_mock.assert_hits_async(0).await;

    Ok(())
}

#[tokio::test]
async fn test_page_with_nothing_to_extract_is_not_found() -> Result<()> {
    let app = TestApp::spawn(50).await?;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/scrape");
            then.status(200).json_body(json!({
                "success": true,
                "data": { "html": "<html><body>Robot check</body></html>" }
            }));
        })
        .await;

    let response = app
        .client
        .post(format!("{}/api/analyze", app.address))
        .json(&json!({ "product_url": PRODUCT_URL }))
        .send()
        .await?;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Could not extract product information or reviews");

    Ok(())
}

#[tokio::test]
async fn test_analyze_form_route() -> Result<()> {
    // Arrange
    let ai = MockAiProvider::new("real");
    ai.add_response("second", "FAKE");
    let extractor = MockExtractor::with_snapshot(snapshot_with_texts(&["first", "second", ""]));
    let analyzer = ReviewAnalyzerBuilder::new()
        .extractor(Box::new(extractor.clone()))
        .ai_provider(Box::new(ai))
        .build()?;
    let app = TestApp::spawn_with_analyzer(analyzer).await?;

    // Act
    let response = app
        .client
        .post(format!("{}/analyze_reviews", app.address))
        .form(&[("product_url", " https://www.amazon.in/dp/B0BFBV4JKK ")])
        .send()
        .await?;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["total_found_count"], 2);
    assert_eq!(body["reviews"][0]["classification"], "REAL");
    assert_eq!(body["reviews"][1]["classification"], "FAKE");
    assert_eq!(
        extractor.get_calls(),
        vec!["https://www.amazon.in/dp/B0BFBV4JKK".to_string()]
    );

    Ok(())
}

#[tokio::test]
async fn test_slow_analysis_times_out() -> Result<()> {
    let ai = MockAiProvider::new("real");
    ai.add_reply(
        "slow",
        MockReply::Delayed(Duration::from_secs(5), "real".to_string()),
    );
    let analyzer = ReviewAnalyzerBuilder::new()
        .extractor(Box::new(MockExtractor::with_snapshot(snapshot_with_texts(&[
            "slow review",
        ]))))
        .ai_provider(Box::new(ai))
        .timeout(Duration::from_millis(100))
        .build()?;
    let app = TestApp::spawn_with_analyzer(analyzer).await?;

    let response = app
        .client
        .post(format!("{}/api/analyze", app.address))
        .json(&json!({ "product_url": PRODUCT_URL }))
        .send()
        .await?;

    assert_eq!(504, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Analysis timed out");

    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests_do_not_share_state() -> Result<()> {
    let ai = MockAiProvider::new("real");
    ai.add_response("alpha", "fake");
    let analyzer = ReviewAnalyzerBuilder::new()
        .extractor(Box::new(MockExtractor::with_snapshot(snapshot_with_texts(&[
            "alpha", "bravo",
        ]))))
        .ai_provider(Box::new(ai))
        .build()?;
    let app = TestApp::spawn_with_analyzer(analyzer).await?;

    let send = || {
        app.client
            .post(format!("{}/api/analyze", app.address))
            .json(&json!({ "product_url": PRODUCT_URL }))
            .send()
    };
    let (first, second) = tokio::join!(send(), send());
    let first: Value = first?.json().await?;
    let second: Value = second?.json().await?;

    assert_ne!(first["analysis_id"], second["analysis_id"]);
    assert_eq!(first["reviews"], second["reviews"]);
    assert_eq!(first["reviews"][0]["classification"], "FAKE");

    Ok(())
}
