//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid processor API base URL")]
    InvalidProcessorUrl,

    #[error("Invalid messaging API base URL")]
    InvalidMessagingUrl,

    #[error("Payment amount must be a positive number of minor units")]
    InvalidAmount,

    #[error("Currency must be a three-letter code")]
    InvalidCurrency,

    #[error("Redirect URL must be absolute (http or https)")]
    InvalidRedirectUrl,

    #[error("Credential store path must not be empty")]
    InvalidStorePath,
}
