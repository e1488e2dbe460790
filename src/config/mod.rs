//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `TILLBOT` prefix and
//! nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use tillbot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod messaging;
mod payment;
mod server;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use messaging::MessagingConfig;
pub use payment::PaymentConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind host, port, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Messaging platform configuration (bot token)
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Payment configuration (processor URL, amounts, currency)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Credential storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables with
    /// the `TILLBOT` prefix:
    ///
    /// - `TILLBOT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TILLBOT__MESSAGING__BOT_TOKEN=...` -> `messaging.bot_token = ...`
    /// - `TILLBOT__PAYMENT__CURRENCY=aud` -> `payment.currency = "aud"`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TILLBOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.messaging.validate()?;
        self.payment.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
