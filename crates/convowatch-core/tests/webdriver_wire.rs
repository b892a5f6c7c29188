//! WebDriver client wire behavior against a mocked remote end.

use httpmock::prelude::*;
use serde_json::json;

use convowatch_core::config::DriverConfig;
use convowatch_core::error::PortalError;
use convowatch_core::webdriver::{Locator, WebDriverSession};

fn driver_config(webdriver_url: String) -> DriverConfig {
    DriverConfig {
        webdriver_url,
        ..Default::default()
    }
}

async fn open_session(server: &MockServer) -> WebDriverSession {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/session")
                .body_contains("acceptInsecureCerts");
            then.status(200)
                .json_body(json!({"value": {"sessionId": "abc123", "capabilities": {}}}));
        })
        .await;
    WebDriverSession::open(&driver_config(server.base_url()))
        .await
        .expect("session should open")
}

#[tokio::test]
async fn opens_session_and_navigates() {
    let server = MockServer::start_async().await;
    let nav = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/session/abc123/url")
                .body_contains("example.org");
            then.status(200).json_body(json!({"value": null}));
        })
        .await;

    let driver = open_session(&server).await;
    assert_eq!(driver.session_id(), "abc123");
    driver.goto("https://example.org/").await.expect("navigate");
    nav.assert_async().await;
}

#[tokio::test]
async fn missing_element_maps_to_no_such_element() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/session/abc123/element");
            then.status(404).json_body(json!({
                "value": {
                    "error": "no such element",
                    "message": "no such element: #nope",
                    "stacktrace": ""
                }
            }));
        })
        .await;

    let driver = open_session(&server).await;
    let err = driver
        .find(&Locator::css("#nope"))
        .await
        .expect_err("should not find");
    assert!(matches!(err, PortalError::NoSuchElement { .. }));
}

#[tokio::test]
async fn screenshot_decodes_base64_payload() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/session/abc123/screenshot");
            then.status(200)
                .json_body(json!({"value": "bm90LWEtcmVhbC1wbmc="}));
        })
        .await;

    let driver = open_session(&server).await;
    let bytes = driver.screenshot().await.expect("screenshot");
    assert_eq!(bytes, b"not-a-real-png");
}

#[tokio::test]
async fn element_interaction_round_trip() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/session/abc123/element");
            then.status(200).json_body(json!({
                "value": {"element-6066-11e4-a52e-4f735466cecf": "el-9"}
            }));
        })
        .await;
    let clear = server
        .mock_async(|when, then| {
            when.method(POST).path("/session/abc123/element/el-9/clear");
            then.status(200).json_body(json!({"value": null}));
        })
        .await;
    let keys = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/session/abc123/element/el-9/value")
                .body_contains("2K19/CO/123");
            then.status(200).json_body(json!({"value": null}));
        })
        .await;

    let driver = open_session(&server).await;
    let element = driver
        .find(&Locator::css(r#"input[placeholder="Enter Roll No"]"#))
        .await
        .expect("find");
    element.fill("2K19/CO/123").await.expect("fill");
    clear.assert_async().await;
    keys.assert_async().await;
}
