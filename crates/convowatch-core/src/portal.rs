//! Portal session driving: login form fill, submit fallback, extraction.
//!
//! The portal contract is reverse-engineered and change-prone: three
//! inputs located by placeholder text, a login control reached through an
//! ordered selector fallback, and literal status substrings in a response
//! that updates the page in place. Everything brittle about it is named
//! here, in one place.

use std::path::PathBuf;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::check::{screenshot_filename, CheckResult};
use crate::classify::classify;
use crate::config::{Credentials, DriverConfig, PortalConfig};
use crate::error::PortalError;
use crate::webdriver::{Locator, WebDriverSession};

const NAME_INPUT: &str = r#"input[placeholder="Enter Name"]"#;
const ROLL_INPUT: &str = r#"input[placeholder="Enter Roll No"]"#;
const DOB_INPUT: &str = r#"input[placeholder="Date of Birth"]"#;

/// Heading that carries the convocation title once the form is answered.
const TITLE_HEADING: &str = "h2";

/// Ordered login-control strategies. Each is tried in turn with a
/// per-strategy timeout; a failure feeds the next, and exhaustion fails
/// the single check, not the run.
pub fn submit_strategies() -> Vec<Locator> {
    vec![
        Locator::css(r#"input[type="submit"][value="Log In"]"#),
        Locator::xpath(r#"//button[contains(normalize-space(.), "Log In")]"#),
        Locator::css("#signin"),
    ]
}

/// One open browser session against the portal, reused sequentially
/// across all roll numbers to amortize browser startup.
pub struct PortalSession {
    driver: WebDriverSession,
    portal: PortalConfig,
    screenshot_dir: PathBuf,
}

impl PortalSession {
    pub async fn open(
        driver_config: &DriverConfig,
        portal: PortalConfig,
        screenshot_dir: PathBuf,
    ) -> Result<Self, PortalError> {
        let driver = WebDriverSession::open(driver_config).await?;
        Ok(Self {
            driver,
            portal,
            screenshot_dir,
        })
    }

    /// Run the full navigate/fill/submit/inspect sequence for one roll
    /// number. Never fails the batch: any error comes back as an
    /// Error-category result for this roll number alone.
    pub async fn check_roll_number(
        &self,
        credentials: &Credentials,
        roll_number: &str,
    ) -> CheckResult {
        match self.try_check(credentials, roll_number).await {
            Ok(result) => result,
            Err(e) => {
                warn!(roll_number = %roll_number, error = %e, "check failed");
                CheckResult::error(
                    roll_number,
                    format!("An error occurred while checking: {e}"),
                )
            }
        }
    }

    async fn try_check(
        &self,
        credentials: &Credentials,
        roll_number: &str,
    ) -> Result<CheckResult, PortalError> {
        info!(roll_number = %roll_number, "navigating to portal");
        self.driver.goto(&self.portal.login_url).await?;
        sleep(self.portal.ready_delay).await;

        debug!(roll_number = %roll_number, "filling credentials");
        self.fill_input(NAME_INPUT, &credentials.name).await?;
        sleep(self.portal.fill_delay).await;
        self.fill_input(ROLL_INPUT, roll_number).await?;
        sleep(self.portal.fill_delay).await;
        self.fill_input(DOB_INPUT, &credentials.date_of_birth).await?;
        sleep(self.portal.form_settle_delay).await;

        self.submit().await?;
        // The portal updates its content in place rather than navigating.
        sleep(self.portal.response_delay).await;

        let page_title = self.extract_title().await;
        let content = self.driver.page_source().await?;
        let category = classify(&content);
        let screenshot_path = self.capture_screenshot(roll_number).await;

        Ok(CheckResult {
            roll_number: roll_number.to_string(),
            category,
            status_detail: category.detail().to_string(),
            page_title,
            screenshot_path,
            succeeded: true,
        })
    }

    async fn fill_input(&self, selector: &str, value: &str) -> Result<(), PortalError> {
        let element = self.driver.find(&Locator::css(selector)).await?;
        element.fill(value).await
    }

    /// Try each login-control strategy in order; the first that locates
    /// and clicks wins. Returns the index of the winning strategy.
    async fn submit(&self) -> Result<usize, PortalError> {
        let strategies = submit_strategies();
        let attempts = strategies.len();
        for (i, locator) in strategies.into_iter().enumerate() {
            match tokio::time::timeout(self.portal.locate_timeout, self.click(&locator)).await
            {
                Ok(Ok(())) => {
                    debug!(strategy = i, locator = %locator, "login control clicked");
                    return Ok(i);
                }
                Ok(Err(e)) => {
                    debug!(strategy = i, error = %e, "login strategy failed, falling back");
                }
                Err(_) => {
                    debug!(strategy = i, "login strategy timed out, falling back");
                }
            }
        }
        Err(PortalError::SubmitExhausted { attempts })
    }

    async fn click(&self, locator: &Locator) -> Result<(), PortalError> {
        let element = self.driver.find(locator).await?;
        element.click().await
    }

    /// Prefer the on-page heading text; fall back to the document title.
    async fn extract_title(&self) -> String {
        if let Ok(element) = self.driver.find(&Locator::css(TITLE_HEADING)).await {
            if let Ok(text) = element.text().await {
                let text = text.trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
        self.driver.title().await.unwrap_or_default()
    }

    /// Capture and persist a screenshot for the roll number just checked.
    /// A capture or write failure only costs the attachment; the check's
    /// status determination stands.
    async fn capture_screenshot(&self, roll_number: &str) -> Option<PathBuf> {
        let path = self.screenshot_dir.join(screenshot_filename(roll_number));
        let bytes = match self.driver.screenshot().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(roll_number = %roll_number, error = %e, "screenshot capture failed");
                return None;
            }
        };
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "screenshot write failed");
                None
            }
        }
    }

    /// Politeness pause between consecutive roll number checks.
    pub async fn pause_between_checks(&self) {
        sleep(self.portal.between_checks_delay).await;
    }

    /// Close the browser once, after the last roll number.
    pub async fn close(self) -> Result<(), PortalError> {
        self.driver.quit().await
    }
}
