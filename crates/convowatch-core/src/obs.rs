//! Tracing setup and structured run-lifecycle events.
//!
//! [`init_tracing`] configures the global subscriber once per process.
//! The emitters below are the events an operator greps the daemon log
//! for: run start/finish, per-roll check completion, delivery outcome.
//! All of them carry the run id via the [`RunSpan`] guard.

use tracing::{info, warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::classify::StatusCategory;

/// Initialise the global tracing subscriber.
///
/// With `json` set, log lines come out as newline-delimited JSON for
/// aggregation. `level` is the default verbosity when `RUST_LOG` is not
/// set. Safe to call more than once; only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// RAII guard that enters a run-scoped span for the duration of a run.
/// Every event inside automatically carries the run id.
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("convowatch.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: run started for a student with N roll numbers.
pub fn emit_run_started(run_id: &str, student: &str, roll_count: usize) {
    info!(event = "run.started", run_id = %run_id, student = %student, roll_count = roll_count);
}

/// Emit event: one roll number check completed.
pub fn emit_check_finished(
    run_id: &str,
    roll_number: &str,
    category: StatusCategory,
    succeeded: bool,
) {
    info!(
        event = "run.check_finished",
        run_id = %run_id,
        roll_number = %roll_number,
        category = ?category,
        succeeded = succeeded,
    );
}

/// Emit event: run finished with duration and per-check success tally.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, checks: usize, succeeded: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        checks = checks,
        succeeded = succeeded,
    );
}

/// Emit event: notification delivery outcome.
pub fn emit_delivery_result(run_id: &str, message_sent: bool, photos_sent: usize) {
    if message_sent {
        info!(
            event = "notify.delivered",
            run_id = %run_id,
            photos_sent = photos_sent,
        );
    } else {
        warn!(
            event = "notify.failed",
            run_id = %run_id,
            photos_sent = photos_sent,
        );
    }
}
