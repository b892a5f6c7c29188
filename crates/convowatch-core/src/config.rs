//! Configuration assembled once at startup from the environment.
//!
//! Every component receives its slice of [`WatchConfig`] by reference;
//! nothing reads process env mid-run. Loaders accept an injected lookup so
//! tests never have to mutate process state.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `STUDENT_NAME` | Student name for the login form | required |
//! | `ROLL_NUMBERS` | Comma-separated roll number variants | required (or `ROLL_NUMBER`) |
//! | `DATE_OF_BIRTH` | Date of birth for the login form | required |
//! | `TELEGRAM_BOT_TOKEN` | Bot token for notifications | required |
//! | `TELEGRAM_CHAT_ID` | Chat to notify | required |
//! | `CONVOWATCH_PORTAL_URL` | Portal login page | convocation portal |
//! | `CONVOWATCH_WEBDRIVER_URL` | WebDriver remote end | `http://127.0.0.1:9515` |
//! | `CONVOWATCH_TELEGRAM_API` | Bot API base | `https://api.telegram.org` |
//! | `CONVOWATCH_SCREENSHOT_DIR` | Screenshot output directory | `.` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_STUDENT_NAME: &str = "STUDENT_NAME";
pub const ENV_ROLL_NUMBERS: &str = "ROLL_NUMBERS";
pub const ENV_ROLL_NUMBER: &str = "ROLL_NUMBER";
pub const ENV_DATE_OF_BIRTH: &str = "DATE_OF_BIRTH";
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_PORTAL_URL: &str = "CONVOWATCH_PORTAL_URL";
pub const ENV_WEBDRIVER_URL: &str = "CONVOWATCH_WEBDRIVER_URL";
pub const ENV_TELEGRAM_API: &str = "CONVOWATCH_TELEGRAM_API";
pub const ENV_SCREENSHOT_DIR: &str = "CONVOWATCH_SCREENSHOT_DIR";

pub const DEFAULT_PORTAL_URL: &str = "https://www.convocation.dtu.ac.in/index.php";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://127.0.0.1:9515";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Login credentials for the portal.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub name: String,
    /// Ordered roll number variants; duplicates are deliberately kept.
    pub roll_numbers: Vec<String>,
    pub date_of_birth: String,
}

impl Credentials {
    /// Load from process environment. Fails fast, naming every missing
    /// variable, before any browser session is opened.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let name = lookup(ENV_STUDENT_NAME);
        let rolls_raw = lookup(ENV_ROLL_NUMBERS).or_else(|| lookup(ENV_ROLL_NUMBER));
        let date_of_birth = lookup(ENV_DATE_OF_BIRTH);

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push(ENV_STUDENT_NAME.to_string());
        }
        if rolls_raw.is_none() {
            missing.push(format!("{ENV_ROLL_NUMBERS} (or {ENV_ROLL_NUMBER})"));
        }
        if date_of_birth.is_none() {
            missing.push(ENV_DATE_OF_BIRTH.to_string());
        }
        let (Some(name), Some(rolls_raw), Some(date_of_birth)) =
            (name, rolls_raw, date_of_birth)
        else {
            return Err(ConfigError::MissingVars { vars: missing });
        };

        let roll_numbers = split_roll_numbers(&rolls_raw);
        if roll_numbers.is_empty() {
            return Err(ConfigError::InvalidVar {
                var: ENV_ROLL_NUMBERS.to_string(),
                reason: "no roll numbers left after parsing".to_string(),
            });
        }

        Ok(Self {
            name,
            roll_numbers,
            date_of_birth,
        })
    }
}

/// Split a comma-delimited roll number list into trimmed entries.
/// Empty entries are dropped; duplicates and order are preserved.
pub fn split_roll_numbers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Portal interaction tuning: the fixed login URL plus the pacing delays
/// the client-side validation scripts need.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub login_url: String,
    /// Wait after navigation for the DOM to settle.
    pub ready_delay: Duration,
    /// Pacing between individual form fills.
    pub fill_delay: Duration,
    /// Wait between the last fill and the submit click.
    pub form_settle_delay: Duration,
    /// Wait after submit; the page updates in place, no navigation.
    pub response_delay: Duration,
    /// Politeness pause between consecutive roll number checks.
    pub between_checks_delay: Duration,
    /// Per-strategy bound for locating the login control.
    pub locate_timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_PORTAL_URL.to_string(),
            ready_delay: Duration::from_millis(2000),
            fill_delay: Duration::from_millis(500),
            form_settle_delay: Duration::from_millis(1000),
            response_delay: Duration::from_millis(4000),
            between_checks_delay: Duration::from_millis(2000),
            locate_timeout: Duration::from_secs(5),
        }
    }
}

/// Browser session parameters passed to the WebDriver remote end.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            window_width: 1280,
            window_height: 720,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Telegram delivery parameters.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API base URL; overridable so tests can point at a local mock.
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let bot_token = lookup(ENV_BOT_TOKEN);
        let chat_id = lookup(ENV_CHAT_ID);

        let mut missing = Vec::new();
        if bot_token.is_none() {
            missing.push(ENV_BOT_TOKEN.to_string());
        }
        if chat_id.is_none() {
            missing.push(ENV_CHAT_ID.to_string());
        }
        let (Some(bot_token), Some(chat_id)) = (bot_token, chat_id) else {
            return Err(ConfigError::MissingVars { vars: missing });
        };

        Ok(Self {
            api_base: lookup(ENV_TELEGRAM_API)
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string()),
            bot_token,
            chat_id,
        })
    }
}

/// Everything one pipeline run needs, built once and passed around.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub credentials: Credentials,
    pub portal: PortalConfig,
    pub driver: DriverConfig,
    pub telegram: TelegramConfig,
    pub screenshot_dir: PathBuf,
}

impl WatchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let credentials = Credentials::from_lookup(&lookup);
        let telegram = TelegramConfig::from_lookup(&lookup);
        match (credentials, telegram) {
            (Ok(credentials), Ok(telegram)) => {
                Ok(Self::assemble(credentials, telegram, &lookup))
            }
            (Err(a), Err(b)) => Err(a.merge(b)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    /// Assemble from already-validated credential pieces plus the ambient
    /// overrides (portal URL, WebDriver end, screenshot directory).
    pub fn assemble(
        credentials: Credentials,
        telegram: TelegramConfig,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut portal = PortalConfig::default();
        if let Some(url) = lookup(ENV_PORTAL_URL) {
            portal.login_url = url;
        }

        let mut driver = DriverConfig::default();
        if let Some(url) = lookup(ENV_WEBDRIVER_URL) {
            driver.webdriver_url = url;
        }

        let screenshot_dir = lookup(ENV_SCREENSHOT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            credentials,
            portal,
            driver,
            telegram,
            screenshot_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(
        pairs: &'a [(&'a str, &'a str)],
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_split_roll_numbers_trims_and_keeps_duplicates() {
        let rolls = split_roll_numbers(" 2K19/CO/123 , 2k19co123 ,2K19/CO/123");
        assert_eq!(rolls, vec!["2K19/CO/123", "2k19co123", "2K19/CO/123"]);
    }

    #[test]
    fn test_split_roll_numbers_drops_empty_entries() {
        assert_eq!(split_roll_numbers("a,,b,"), vec!["a", "b"]);
        assert!(split_roll_numbers("  ,").is_empty());
    }

    #[test]
    fn test_credentials_missing_fields_are_all_named() {
        let err = Credentials::from_lookup(lookup_from(&[("DATE_OF_BIRTH", "01-01-2001")]))
            .expect_err("should fail");
        let text = err.to_string();
        assert!(text.contains("STUDENT_NAME"));
        assert!(text.contains("ROLL_NUMBERS"));
        assert!(!text.contains("DATE_OF_BIRTH"));
    }

    #[test]
    fn test_credentials_single_roll_fallback() {
        let creds = Credentials::from_lookup(lookup_from(&[
            ("STUDENT_NAME", "A Student"),
            ("ROLL_NUMBER", "2K19/CO/123"),
            ("DATE_OF_BIRTH", "01-01-2001"),
        ]))
        .expect("should load");
        assert_eq!(creds.roll_numbers, vec!["2K19/CO/123"]);
    }

    #[test]
    fn test_watch_config_merges_missing_lists() {
        let err = WatchConfig::from_lookup(|_| None).expect_err("should fail");
        let text = err.to_string();
        assert!(text.contains("STUDENT_NAME"));
        assert!(text.contains("TELEGRAM_BOT_TOKEN"));
        assert!(text.contains("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn test_watch_config_defaults_and_overrides() {
        let config = WatchConfig::from_lookup(lookup_from(&[
            ("STUDENT_NAME", "A Student"),
            ("ROLL_NUMBERS", "1,2"),
            ("DATE_OF_BIRTH", "01-01-2001"),
            ("TELEGRAM_BOT_TOKEN", "token"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("CONVOWATCH_WEBDRIVER_URL", "http://localhost:4444"),
        ]))
        .expect("should load");
        assert_eq!(config.driver.webdriver_url, "http://localhost:4444");
        assert_eq!(config.portal.login_url, DEFAULT_PORTAL_URL);
        assert_eq!(config.telegram.api_base, DEFAULT_TELEGRAM_API);
        assert_eq!(config.screenshot_dir, PathBuf::from("."));
    }
}
