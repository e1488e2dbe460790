//! Telegram send-message adapter.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::message::ChatId;
use crate::ports::{Messenger, SendError};

/// Default Telegram Bot API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// `Messenger` implementation over the Telegram Bot API.
///
/// Replies use HTML parse mode, matching the light markup the reply builders
/// emit.
pub struct TelegramMessenger {
    http_client: reqwest::Client,
    api_base_url: String,
    bot_token: SecretString,
}

impl TelegramMessenger {
    pub fn new(api_base_url: impl Into<String>, bot_token: SecretString) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base_url: api_base_url.into(),
            bot_token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base_url,
            self.bot_token.expose_secret(),
            method
        )
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), SendError> {
        let params = [
            ("chat_id", chat_id.to_string()),
            ("text", text.to_string()),
            ("parse_mode", "HTML".to_string()),
        ];

        let response = self
            .http_client
            .post(self.method_url("sendMessage"))
            .form(&params)
            .send()
            .await
            .map_err(|e| SendError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SendError::Delivery(format!(
                "sendMessage returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
