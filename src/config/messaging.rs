//! Messaging platform configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Messaging (Telegram) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    /// Bot API token
    pub bot_token: String,

    /// Bot API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl MessagingConfig {
    /// Validate messaging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_token.is_empty() {
            return Err(ValidationError::MissingRequired(
                "TILLBOT__MESSAGING__BOT_TOKEN",
            ));
        }
        if !self.api_base_url.starts_with("http") {
            return Err(ValidationError::InvalidMessagingUrl);
        }
        Ok(())
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}
