//! # Server Endpoint Tests
//!
//! Health checks, the JSON 404 fallback and request validation.

mod common;

use anyhow::Result;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn test_root_and_health_check_endpoints() -> Result<()> {
    // Arrange
    let app = TestApp::spawn(50).await?;

    // Act
    let root_response = app.client.get(format!("{}/", app.address)).send().await?;
    let health_response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await?;

    // Assert
    assert!(root_response.status().is_success());
    assert_eq!("reviewlens server is running.", root_response.text().await?);
    assert!(health_response.status().is_success());
    assert_eq!("OK", health_response.text().await?);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_json_404() -> Result<()> {
    let app = TestApp::spawn(50).await?;

    let response = app
        .client
        .get(format!("{}/does/not/exist", app.address))
        .send()
        .await?;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Resource not found");

    Ok(())
}

#[tokio::test]
async fn test_missing_product_url_is_bad_request() -> Result<()> {
    let app = TestApp::spawn(50).await?;

    let json_response = app
        .client
        .post(format!("{}/api/analyze", app.address))
        .json(&json!({}))
        .send()
        .await?;
    let form_response = app
        .client
        .post(format!("{}/analyze_reviews", app.address))
        .form(&[("product_url", "   ")])
        .send()
        .await?;

    for response in [json_response, form_response] {
        assert_eq!(400, response.status().as_u16());
        let body: Value = response.json().await?;
        assert_eq!(body["error"], "No product_url provided");
    }

    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_rejected() -> Result<()> {
    let app = TestApp::spawn(50).await?;

    let response = app
        .client
        .post(format!("{}/api/analyze", app.address))
        .header("Content-Type", "application/json")
        .body(r#"{"product_url": "https://x.test""#)
        .send()
        .await?;

    assert_eq!(400, response.status().as_u16());

    Ok(())
}
