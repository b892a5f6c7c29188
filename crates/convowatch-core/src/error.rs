//! Error taxonomy for the watcher.
//!
//! Three concerns, three types: configuration failures abort a run before
//! any portal I/O, portal failures are contained to the roll number being
//! checked, and notification failures are logged without failing the run.

use std::path::PathBuf;

/// Errors raised while assembling configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", vars.join(", "))]
    MissingVars { vars: Vec<String> },

    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: String, reason: String },
}

impl ConfigError {
    /// Combine two errors into one, concatenating missing-variable lists.
    pub fn merge(self, other: ConfigError) -> ConfigError {
        match (self, other) {
            (ConfigError::MissingVars { mut vars }, ConfigError::MissingVars { vars: more }) => {
                vars.extend(more);
                ConfigError::MissingVars { vars }
            }
            (first, _) => first,
        }
    }
}

/// Errors raised while driving the portal through the WebDriver remote end.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("webdriver transport error: {0}")]
    Transport(String),

    #[error("webdriver error: {error}: {message}")]
    Wire { error: String, message: String },

    #[error("no such element: {selector}")]
    NoSuchElement { selector: String },

    #[error("login control not found after {attempts} selector strategies")]
    SubmitExhausted { attempts: usize },
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        PortalError::Transport(err.to_string())
    }
}

/// Errors raised while delivering notifications through the Telegram Bot API.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("telegram transport error: {0}")]
    Transport(String),

    #[error("telegram api rejected the call: {description}")]
    Rejected { description: String },

    #[error("could not read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_vars_display_lists_all() {
        let err = ConfigError::MissingVars {
            vars: vec!["STUDENT_NAME".to_string(), "DATE_OF_BIRTH".to_string()],
        };
        let text = err.to_string();
        assert!(text.contains("missing required configuration"));
        assert!(text.contains("STUDENT_NAME"));
        assert!(text.contains("DATE_OF_BIRTH"));
    }

    #[test]
    fn test_merge_concatenates_missing_lists() {
        let a = ConfigError::MissingVars {
            vars: vec!["STUDENT_NAME".to_string()],
        };
        let b = ConfigError::MissingVars {
            vars: vec!["TELEGRAM_CHAT_ID".to_string()],
        };
        let merged = a.merge(b);
        let text = merged.to_string();
        assert!(text.contains("STUDENT_NAME"));
        assert!(text.contains("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn test_portal_error_display() {
        let err = PortalError::SubmitExhausted { attempts: 3 };
        assert!(err.to_string().contains("3 selector strategies"));

        let err = PortalError::NoSuchElement {
            selector: "css selector #signin".to_string(),
        };
        assert!(err.to_string().contains("#signin"));
    }
}
