//! Notifier delivery against a mocked Bot API.

use std::path::PathBuf;

use httpmock::prelude::*;
use serde_json::json;

use convowatch_core::check::{now_ist, CheckResult, Report};
use convowatch_core::classify::StatusCategory;
use convowatch_core::config::TelegramConfig;
use convowatch_core::notify::TelegramNotifier;

fn telegram_config(api_base: String) -> TelegramConfig {
    TelegramConfig {
        api_base,
        bot_token: "test-token".to_string(),
        chat_id: "42".to_string(),
    }
}

fn result_with_screenshot(roll: &str, screenshot_path: Option<PathBuf>) -> CheckResult {
    CheckResult {
        roll_number: roll.to_string(),
        category: StatusCategory::NotFound,
        status_detail: StatusCategory::NotFound.detail().to_string(),
        page_title: "Convocation 2026".to_string(),
        screenshot_path,
        succeeded: true,
    }
}

fn report_for(results: Vec<CheckResult>) -> Report {
    Report {
        student: "A Student".to_string(),
        checked_at: now_ist(),
        results,
    }
}

#[tokio::test]
async fn delivers_one_message_and_one_photo_per_existing_screenshot() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let first = dir.path().join("screenshot_a.png");
    let second = dir.path().join("screenshot_b.png");
    std::fs::write(&first, b"png-bytes-a").expect("write");
    std::fs::write(&second, b"png-bytes-b").expect("write");
    let ghost = dir.path().join("screenshot_missing.png");

    let message = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bottest-token/sendMessage")
                .body_contains("chat_id=42")
                .body_contains("parse_mode=HTML");
            then.status(200).json_body(json!({"ok": true, "result": {}}));
        })
        .await;
    let photo_one = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bottest-token/sendPhoto")
                .body_contains("Screenshot 1 of 2");
            then.status(200).json_body(json!({"ok": true, "result": {}}));
        })
        .await;
    let photo_two = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bottest-token/sendPhoto")
                .body_contains("Screenshot 2 of 2");
            then.status(200).json_body(json!({"ok": true, "result": {}}));
        })
        .await;

    let report = report_for(vec![
        result_with_screenshot("a", Some(first)),
        result_with_screenshot("b", Some(second)),
        result_with_screenshot("c", Some(ghost)),
    ]);
    let notifier = TelegramNotifier::new(telegram_config(server.base_url()));
    let outcome = notifier.deliver(&report, "report text").await;

    assert!(outcome.message_sent);
    assert_eq!(outcome.photos_sent, 2);
    assert_eq!(outcome.photos_total, 2);
    message.assert_async().await;
    photo_one.assert_async().await;
    photo_two.assert_async().await;
}

#[tokio::test]
async fn delivery_failure_is_absorbed_not_raised() {
    let server = MockServer::start_async().await;
    let message = server
        .mock_async(|when, then| {
            when.method(POST).path("/bottest-token/sendMessage");
            then.status(500)
                .json_body(json!({"ok": false, "description": "Internal Server Error"}));
        })
        .await;

    let report = report_for(vec![result_with_screenshot("a", None)]);
    let notifier = TelegramNotifier::new(telegram_config(server.base_url()));
    let outcome = notifier.deliver(&report, "report text").await;

    assert!(!outcome.message_sent);
    assert_eq!(outcome.photos_total, 0);
    message.assert_async().await;
}

#[tokio::test]
async fn api_level_rejection_counts_as_failure() {
    // 200 with ok=false still means the call did not land.
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/bottest-token/sendMessage");
            then.status(200)
                .json_body(json!({"ok": false, "description": "chat not found"}));
        })
        .await;

    let notifier = TelegramNotifier::new(telegram_config(server.base_url()));
    let err = notifier.send_message("hello").await.expect_err("should fail");
    assert!(err.to_string().contains("chat not found"));
}
