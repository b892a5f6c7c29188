//! Per-roll-number check outcomes and run-level report data.
//!
//! Nothing here outlives a single run; results are created once per roll
//! number and never mutated afterwards.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::StatusCategory;

/// Outcome of testing one roll number against the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub roll_number: String,
    pub category: StatusCategory,
    pub status_detail: String,
    pub page_title: String,
    pub screenshot_path: Option<PathBuf>,
    pub succeeded: bool,
}

impl CheckResult {
    /// Error-category result for a check that failed outright.
    pub fn error(roll_number: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            roll_number: roll_number.into(),
            category: StatusCategory::Error,
            status_detail: detail.into(),
            page_title: "Error".to_string(),
            screenshot_path: None,
            succeeded: false,
        }
    }
}

/// Aggregated outcome of one pipeline run.
///
/// Invariant: one result per roll number supplied; a per-roll failure
/// yields an Error-category result, never a shorter report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub student: String,
    pub checked_at: DateTime<FixedOffset>,
    pub results: Vec<CheckResult>,
}

impl Report {
    /// Screenshot paths recorded on results, in report order.
    pub fn screenshot_paths(&self) -> Vec<&Path> {
        self.results
            .iter()
            .filter_map(|result| result.screenshot_path.as_deref())
            .collect()
    }
}

/// Indian Standard Time, the portal's (and the operator's) timezone.
pub fn ist_offset() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("IST offset is in range")
}

/// Current wall-clock time in IST.
pub fn now_ist() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&ist_offset())
}

/// Deterministic screenshot filename for a roll number.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`, so the result is
/// always a single valid path component even for slash-bearing roll
/// numbers like `2K19/CO/123`.
pub fn screenshot_filename(roll_number: &str) -> String {
    let safe: String = roll_number
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("screenshot_{safe}.png")
}
