//! Minimal W3C WebDriver client.
//!
//! Speaks just enough of the protocol to drive a chromedriver-style
//! remote end: session lifecycle, navigation, element lookup, keystrokes,
//! clicks, and screenshots. Everything is JSON over HTTP; wire errors
//! surface as [`PortalError`].

use std::time::Duration;

use base64::Engine;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::DriverConfig;
use crate::error::PortalError;

/// W3C key under which element references travel on the wire.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Element lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    /// Wire value for the `using` field.
    fn using(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css selector",
            Locator::XPath(_) => "xpath",
        }
    }

    fn value(&self) -> &str {
        match self {
            Locator::Css(selector) | Locator::XPath(selector) => selector,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.using(), self.value())
    }
}

/// Handle to one live browser session on the remote end.
#[derive(Debug)]
pub struct WebDriverSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverSession {
    /// Create a browser session with the portal-appropriate capabilities:
    /// insecure-cert acceptance (the target site's certificate is known to
    /// be broken), eager page loads (DOM ready, not network idle), fixed
    /// viewport and user agent.
    pub async fn open(config: &DriverConfig) -> Result<Self, PortalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PortalError::Transport(e.to_string()))?;

        let mut args = vec![
            "--ignore-certificate-errors".to_string(),
            format!(
                "--window-size={},{}",
                config.window_width, config.window_height
            ),
            format!("--user-agent={}", config.user_agent),
        ];
        if config.headless {
            args.insert(0, "--headless=new".to_string());
        }

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "acceptInsecureCerts": true,
                    "pageLoadStrategy": "eager",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let base_url = config.webdriver_url.trim_end_matches('/').to_string();
        let response = client
            .post(format!("{base_url}/session"))
            .json(&capabilities)
            .send()
            .await?;
        let value = Self::decode(response).await?;
        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| PortalError::Wire {
                error: "invalid session response".to_string(),
                message: value.to_string(),
            })?
            .to_string();

        debug!(session_id = %session_id, "webdriver session created");
        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    /// Navigate; returns once the page-load strategy is satisfied.
    pub async fn goto(&self, url: &str) -> Result<(), PortalError> {
        self.post("url", json!({ "url": url })).await.map(|_| ())
    }

    /// Document title.
    pub async fn title(&self) -> Result<String, PortalError> {
        Ok(self.get("title").await?.as_str().unwrap_or_default().to_string())
    }

    /// Full rendered page source.
    pub async fn page_source(&self) -> Result<String, PortalError> {
        Ok(self.get("source").await?.as_str().unwrap_or_default().to_string())
    }

    /// Find one element. [`PortalError::NoSuchElement`] when the remote
    /// end reports none, so callers can fall back to another locator.
    pub async fn find(&self, locator: &Locator) -> Result<Element<'_>, PortalError> {
        let value = self
            .post(
                "element",
                json!({ "using": locator.using(), "value": locator.value() }),
            )
            .await?;
        let element_id = value[ELEMENT_KEY]
            .as_str()
            .ok_or_else(|| PortalError::NoSuchElement {
                selector: locator.to_string(),
            })?
            .to_string();
        Ok(Element {
            session: self,
            element_id,
        })
    }

    /// Viewport screenshot as PNG bytes, decoded from the wire base64.
    pub async fn screenshot(&self) -> Result<Vec<u8>, PortalError> {
        let value = self.get("screenshot").await?;
        let encoded = value.as_str().unwrap_or_default();
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| PortalError::Wire {
                error: "invalid screenshot payload".to_string(),
                message: e.to_string(),
            })
    }

    /// End the session; the remote end closes the browser.
    pub async fn quit(self) -> Result<(), PortalError> {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        let response = self.client.delete(url).send().await?;
        Self::decode(response).await.map(|_| ())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn get(&self, path: &str) -> Result<Value, PortalError> {
        let response = self.client.get(self.session_url(path)).send().await?;
        Self::decode(response).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, PortalError> {
        let response = self
            .client
            .post(self.session_url(path))
            .json(&body)
            .send()
            .await?;
        Self::decode(response).await
    }

    fn session_url(&self, path: &str) -> String {
        format!("{}/session/{}/{}", self.base_url, self.session_id, path)
    }

    /// Unwrap the W3C `{"value": ...}` envelope, mapping error payloads to
    /// typed errors.
    async fn decode(response: reqwest::Response) -> Result<Value, PortalError> {
        let status = response.status();
        let mut body: Value = response
            .json()
            .await
            .map_err(|e| PortalError::Transport(e.to_string()))?;
        let value = body
            .get_mut("value")
            .map(Value::take)
            .unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(value);
        }

        let error = value["error"].as_str().unwrap_or("unknown").to_string();
        let message = value["message"].as_str().unwrap_or_default().to_string();
        if error == "no such element" {
            return Err(PortalError::NoSuchElement { selector: message });
        }
        Err(PortalError::Wire { error, message })
    }
}

/// Reference to a located element within a session.
#[derive(Debug)]
pub struct Element<'a> {
    session: &'a WebDriverSession,
    element_id: String,
}

impl Element<'_> {
    /// Clear the element, then type into it.
    pub async fn fill(&self, text: &str) -> Result<(), PortalError> {
        self.session
            .post(&format!("element/{}/clear", self.element_id), json!({}))
            .await?;
        self.session
            .post(
                &format!("element/{}/value", self.element_id),
                json!({ "text": text }),
            )
            .await
            .map(|_| ())
    }

    pub async fn click(&self) -> Result<(), PortalError> {
        self.session
            .post(&format!("element/{}/click", self.element_id), json!({}))
            .await
            .map(|_| ())
    }

    /// Rendered text content.
    pub async fn text(&self) -> Result<String, PortalError> {
        Ok(self
            .session
            .get(&format!("element/{}/text", self.element_id))
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}
