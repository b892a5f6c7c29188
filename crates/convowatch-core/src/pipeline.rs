//! Single-pass check pipeline: session → checks → report → delivery.
//!
//! Strictly sequential by design: one browser session reused across roll
//! numbers, never in parallel, so the remote portal is not overloaded and
//! navigation state stays unambiguous.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, warn};
use uuid::Uuid;

use crate::check::{now_ist, CheckResult, Report};
use crate::config::{Credentials, WatchConfig};
use crate::error::ConfigError;
use crate::notify::{DeliveryOutcome, TelegramNotifier};
use crate::obs;
use crate::portal::PortalSession;
use crate::report::format_report;

/// One portal check backend. The production implementation is a live
/// browser session; tests substitute a fake.
#[async_trait]
pub trait Portal: Send + Sync {
    /// Check one roll number; must never panic and never fail the batch.
    async fn check(&self, credentials: &Credentials, roll_number: &str) -> CheckResult;

    /// Politeness pause between consecutive checks.
    async fn pause(&self);
}

#[async_trait]
impl Portal for PortalSession {
    async fn check(&self, credentials: &Credentials, roll_number: &str) -> CheckResult {
        self.check_roll_number(credentials, roll_number).await
    }

    async fn pause(&self) {
        self.pause_between_checks().await;
    }
}

/// Check every roll number sequentially against one portal backend.
///
/// Returns exactly one result per roll number, in input order. The pause
/// runs between checks, not after the last one.
pub async fn run_checks<P: Portal + ?Sized>(
    portal: &P,
    credentials: &Credentials,
) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(credentials.roll_numbers.len());
    let last = credentials.roll_numbers.len().saturating_sub(1);
    for (i, roll_number) in credentials.roll_numbers.iter().enumerate() {
        let result = portal.check(credentials, roll_number).await;
        results.push(result);
        if i < last {
            portal.pause().await;
        }
    }
    results
}

/// Synthetic single-result report for a run that failed configuration
/// validation, before any portal interaction.
pub fn config_failure_report(error: &ConfigError) -> Report {
    let result = CheckResult::error("N/A", error.to_string());
    Report {
        student: String::new(),
        checked_at: now_ist(),
        results: vec![result],
    }
}

/// Outcome of one full pipeline run.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub report: Report,
    pub delivery: DeliveryOutcome,
}

/// Execute one complete pipeline pass: open a session, check every roll
/// number, format the report, and deliver it.
///
/// Per-roll failures are contained by the portal driver. A session that
/// cannot be opened at all is fatal to the batch and yields a single
/// Error-category result covering every roll number.
pub async fn run(config: &WatchConfig) -> RunOutcome {
    let run_id = Uuid::new_v4();
    let run_tag = run_id.to_string();
    let _span = obs::RunSpan::enter(&run_tag);
    let started = Instant::now();

    let credentials = &config.credentials;
    obs::emit_run_started(&run_tag, &credentials.name, credentials.roll_numbers.len());

    let results = match PortalSession::open(
        &config.driver,
        config.portal.clone(),
        config.screenshot_dir.clone(),
    )
    .await
    {
        Ok(session) => {
            let results = run_checks(&session, credentials).await;
            if let Err(e) = session.close().await {
                warn!(error = %e, "browser session close failed");
            }
            results
        }
        Err(e) => {
            error!(error = %e, "browser session could not be opened");
            vec![CheckResult::error("All", format!("Failed to run checks: {e}"))]
        }
    };

    for result in &results {
        obs::emit_check_finished(
            &run_tag,
            &result.roll_number,
            result.category,
            result.succeeded,
        );
    }

    let report = Report {
        student: credentials.name.clone(),
        checked_at: now_ist(),
        results,
    };

    let text = format_report(&report);
    let notifier = TelegramNotifier::new(config.telegram.clone());
    let delivery = notifier.deliver(&report, &text).await;
    obs::emit_delivery_result(&run_tag, delivery.message_sent, delivery.photos_sent);

    let succeeded = report.results.iter().filter(|r| r.succeeded).count();
    obs::emit_run_finished(
        &run_tag,
        started.elapsed().as_millis() as u64,
        report.results.len(),
        succeeded,
    );

    RunOutcome {
        run_id,
        report,
        delivery,
    }
}
