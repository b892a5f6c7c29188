//! HTTP trigger surface: health reporting plus fire-and-forget and
//! synchronous check runs.
//!
//! The pipeline runs as a separate `convowatch check` process with
//! captured stdout/stderr and exit code. The background endpoint answers
//! 202 immediately and relies on Telegram as the result channel; the
//! synchronous endpoint blocks up to a fixed bound and reports captured
//! output inline.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::process::Command;
use tracing::{error, info};

use convowatch_core::now_ist;

/// How the daemon launches one pipeline run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Program plus arguments for one pipeline pass.
    pub command: Vec<String>,
    /// Upper bound for the synchronous endpoint.
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: vec!["convowatch".to_string(), "check".to_string()],
            timeout: Duration::from_secs(300),
        }
    }
}

/// Captured outcome of one subprocess run.
#[derive(Debug, Clone)]
pub struct RunCapture {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Errors from launching or bounding the pipeline subprocess.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("check run timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to launch check run: {0}")]
    Launch(String),
}

/// Run the pipeline subprocess to completion, capturing output. No time
/// bound: each step inside the pipeline carries its own timeout.
pub async fn run_pipeline(config: &RunnerConfig) -> Result<RunCapture, RunnerError> {
    let (program, args) = config
        .command
        .split_first()
        .ok_or_else(|| RunnerError::Launch("empty runner command".to_string()))?;

    let child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| RunnerError::Launch(e.to_string()))?;

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| RunnerError::Launch(e.to_string()))?;

    Ok(RunCapture {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Run the pipeline subprocess under the configured time bound. On
/// timeout the child is killed via kill-on-drop, though the browser it
/// spawned may outlive it briefly.
pub async fn run_pipeline_bounded(config: &RunnerConfig) -> Result<RunCapture, RunnerError> {
    tokio::time::timeout(config.timeout, run_pipeline(config))
        .await
        .map_err(|_| RunnerError::Timeout(config.timeout))?
}

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<RunnerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/check", get(check_handler))
        .route("/check-sync", get(check_sync_handler))
        .with_state(state)
}

pub async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Convocation Checker API",
        "endpoints": {
            "/check": "Trigger a check in the background",
            "/check-sync": "Trigger a check and wait for completion",
            "/health": "Health check endpoint"
        }
    }))
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": now_ist().to_rfc3339(),
    }))
}

/// 202 immediately; the run proceeds in the background and reports over
/// Telegram.
pub async fn check_handler(State(state): State<AppState>) -> Response {
    let timestamp = now_ist().to_rfc3339();
    let runner = state.runner.clone();
    tokio::spawn(async move {
        match run_pipeline(&runner).await {
            Ok(capture) if capture.success => {
                info!(event = "trigger.background_finished", "background check completed");
            }
            Ok(capture) => {
                error!(
                    event = "trigger.background_failed",
                    exit_code = capture.exit_code,
                    stderr = %capture.stderr,
                    "background check failed",
                );
            }
            Err(e) => {
                error!(event = "trigger.background_failed", error = %e, "background check did not run");
            }
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "accepted",
            "message": "Convocation check started",
            "timestamp": timestamp,
            "note": "The check is running in the background. Results will be sent via Telegram."
        })),
    )
        .into_response()
}

/// Run inline under the configured bound; 200 with captured output on
/// success, 500 with an error field otherwise.
pub async fn check_sync_handler(State(state): State<AppState>) -> Response {
    let timestamp = now_ist().to_rfc3339();
    match run_pipeline_bounded(&state.runner).await {
        Ok(capture) if capture.success => (
            StatusCode::OK,
            Json(json!({
                "status": "completed",
                "message": "Convocation check completed successfully",
                "timestamp": timestamp,
                "output": capture.stdout,
                "note": "Results have been sent via Telegram."
            })),
        )
            .into_response(),
        Ok(capture) => {
            let error = if capture.stderr.is_empty() {
                format!("check exited with code {}", capture.exit_code)
            } else {
                capture.stderr
            };
            failure_response(timestamp, error)
        }
        Err(e) => failure_response(timestamp, e.to_string()),
    }
}

fn failure_response(timestamp: String, error: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "status": "failed",
            "message": "Convocation check failed",
            "timestamp": timestamp,
            "error": error,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(command: &[&str], timeout: Duration) -> RunnerConfig {
        RunnerConfig {
            command: command.iter().map(|s| s.to_string()).collect(),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_run_pipeline_captures_stdout() {
        let capture = run_pipeline(&runner(&["echo", "hello"], Duration::from_secs(5)))
            .await
            .expect("echo should run");
        assert!(capture.success);
        assert_eq!(capture.exit_code, 0);
        assert!(capture.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_run_pipeline_reports_failure_exit_code() {
        let capture = run_pipeline(&runner(&["false"], Duration::from_secs(5)))
            .await
            .expect("false should run");
        assert!(!capture.success);
        assert_ne!(capture.exit_code, 0);
    }

    #[tokio::test]
    async fn test_run_pipeline_launch_error() {
        let err = run_pipeline(&runner(
            &["convowatch-no-such-binary-for-test"],
            Duration::from_secs(5),
        ))
        .await
        .expect_err("should not launch");
        assert!(matches!(err, RunnerError::Launch(_)));
    }

    #[tokio::test]
    async fn test_bounded_run_times_out() {
        let started = std::time::Instant::now();
        let err = run_pipeline_bounded(&runner(&["sleep", "30"], Duration::from_millis(200)))
            .await
            .expect_err("should time out");
        assert!(matches!(err, RunnerError::Timeout(_)));
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    fn state_with(command: &[&str], timeout: Duration) -> AppState {
        AppState {
            runner: Arc::new(runner(command, timeout)),
        }
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_check_sync_handler_maps_timeout_to_500() {
        let state = state_with(&["sleep", "30"], Duration::from_millis(200));
        let response = check_sync_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["status"], "failed");
        assert!(body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn test_check_sync_handler_returns_captured_output() {
        let state = state_with(&["echo", "pipeline ran"], Duration::from_secs(5));
        let response = check_sync_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "completed");
        assert!(body["output"]
            .as_str()
            .unwrap_or_default()
            .contains("pipeline ran"));
    }

    #[tokio::test]
    async fn test_check_handler_accepts_without_waiting() {
        let state = state_with(&["sleep", "5"], Duration::from_secs(30));
        let started = std::time::Instant::now();
        let response = check_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(started.elapsed() < Duration::from_secs(2));
        let body = json_body(response).await;
        assert_eq!(body["status"], "accepted");
    }

    #[tokio::test]
    async fn test_health_handler_reports_ist_timestamp() {
        let Json(body) = health_handler().await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"]
            .as_str()
            .unwrap_or_default()
            .contains("+05:30"));
    }

    #[tokio::test]
    async fn test_root_handler_lists_endpoints() {
        let Json(body) = root_handler().await;
        assert!(body["endpoints"]["/check"].is_string());
        assert!(body["endpoints"]["/check-sync"].is_string());
    }
}
