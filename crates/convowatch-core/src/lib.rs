//! Convocation portal watcher core.
//!
//! One linear pipeline per run: load credentials, drive a browser session
//! through the portal's login form once per roll number, classify each
//! response against an ordered rule set, capture screenshots, and deliver
//! an aggregated report over Telegram. No state survives a run.

pub mod check;
pub mod classify;
pub mod config;
pub mod error;
pub mod notify;
pub mod obs;
pub mod pipeline;
pub mod portal;
pub mod report;
pub mod webdriver;

pub use check::{now_ist, screenshot_filename, CheckResult, Report};
pub use classify::{classify, StatusCategory};
pub use config::{
    split_roll_numbers, Credentials, DriverConfig, PortalConfig, TelegramConfig, WatchConfig,
};
pub use error::{ConfigError, NotifyError, PortalError};
pub use notify::{DeliveryOutcome, TelegramNotifier};
pub use obs::init_tracing;
pub use pipeline::{config_failure_report, run, run_checks, Portal, RunOutcome};
pub use portal::PortalSession;
pub use report::format_report;
pub use webdriver::{Locator, WebDriverSession};
