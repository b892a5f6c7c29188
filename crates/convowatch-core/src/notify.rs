//! Telegram Bot API delivery.
//!
//! Two call shapes: `sendMessage` with the formatted report (HTML parse
//! mode) and one multipart `sendPhoto` per captured screenshot. Delivery
//! failures are logged and never fail the run; Telegram is the out-of-band
//! signal, not a dependency.

use std::path::Path;

use reqwest::multipart;
use serde::Deserialize;
use tracing::{info, warn};

use crate::check::Report;
use crate::config::TelegramConfig;
use crate::error::NotifyError;

/// Subset of the Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// What actually got delivered for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub message_sent: bool,
    pub photos_sent: usize,
    pub photos_total: usize,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Deliver the report text plus every screenshot that exists on disk,
    /// captioned `Screenshot i of N` in report order. Failures are logged;
    /// the outcome says what landed.
    pub async fn deliver(&self, report: &Report, text: &str) -> DeliveryOutcome {
        let message_sent = match self.send_message(text).await {
            Ok(()) => {
                info!("report message sent");
                true
            }
            Err(e) => {
                warn!(error = %e, "report message delivery failed");
                false
            }
        };

        let screenshots: Vec<&Path> = report
            .screenshot_paths()
            .into_iter()
            .filter(|path| path.exists())
            .collect();
        let photos_total = screenshots.len();
        let mut photos_sent = 0;
        for (i, path) in screenshots.iter().enumerate() {
            let caption = format!("Screenshot {} of {}", i + 1, photos_total);
            match self.send_photo(path, &caption).await {
                Ok(()) => photos_sent += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "screenshot delivery failed");
                }
            }
        }

        DeliveryOutcome {
            message_sent,
            photos_sent,
            photos_total,
        }
    }

    /// `sendMessage` with the Telegram HTML subset.
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let params = [
            ("chat_id", self.config.chat_id.as_str()),
            ("text", text),
            ("parse_mode", "HTML"),
        ];
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .form(&params)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `sendPhoto` multipart upload with a caption.
    pub async fn send_photo(&self, path: &Path, caption: &str) -> Result<(), NotifyError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| NotifyError::Attachment {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "screenshot.png".to_string());
        let photo = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/png")
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        let form = multipart::Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    async fn decode(response: reqwest::Response) -> Result<(), NotifyError> {
        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        if status.is_success() && body.ok {
            return Ok(());
        }
        Err(NotifyError::Rejected {
            description: body
                .description
                .unwrap_or_else(|| format!("http status {status}")),
        })
    }
}
