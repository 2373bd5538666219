//! Telegram Bot API transport
//!
//! Sends messages with `POST {api}/bot{token}/sendMessage`. Uses the blocking
//! reqwest client, so it must not be created or used from inside an async
//! runtime's worker thread.

use super::{OutgoingMessage, Transport};
use crate::core::{LoggerError, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Timeout for a single Bot API request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

/// The bot account behind a token, as returned by `getMe`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

/// HTTP client for the Telegram Bot API
///
/// # Example
///
/// ```no_run
/// use rust_telegram_logger::transport::{OutgoingMessage, TelegramTransport, Transport};
///
/// let transport = TelegramTransport::new("123456:ABC-DEF").expect("valid token");
/// transport
///     .send(&OutgoingMessage::new(-1001234567890, "deploy finished"))
///     .expect("message delivered");
/// ```
pub struct TelegramTransport {
    client: Client,
    api_url: String,
    token: String,
}

impl TelegramTransport {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_options(token, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport against a custom API endpoint (a local Bot API
    /// server, a proxy, or a mock in tests)
    pub fn with_options(
        token: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(LoggerError::missing_token());
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch the bot account, which also verifies the token
    pub fn get_me(&self) -> Result<BotUser> {
        self.call::<BotUser, ()>("getMe", None)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    fn call<T, B>(&self, method: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let mut request = self.client.post(self.method_url(method));
        if let Some(body) = body {
            request = request.json(body);
        }

        // The request URL carries the token; keep it out of error messages
        let response = request.send().map_err(|e| LoggerError::Http(e.without_url()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| LoggerError::Http(e.without_url()))?;

        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(ApiResponse {
                ok: true,
                result: Some(result),
                ..
            }) => Ok(result),
            Ok(ApiResponse { ok: true, .. }) => Err(LoggerError::telegram_api(
                i64::from(status.as_u16()),
                format!("{} returned no result", method),
            )),
            Ok(api) => Err(LoggerError::telegram_api(
                api.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                api.description.unwrap_or_else(|| status.to_string()),
            )),
            Err(_) if !status.is_success() => Err(LoggerError::telegram_api(
                i64::from(status.as_u16()),
                status.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

impl Transport for TelegramTransport {
    fn send(&self, message: &OutgoingMessage) -> Result<()> {
        self.call::<serde_json::Value, _>("sendMessage", Some(message))
            .map(|_| ())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

impl fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
