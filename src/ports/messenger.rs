//! Outbound messaging port.
//!
//! The core's only contact with the chat platform on the way out: deliver one
//! text message to a chat. Callers treat delivery as fire-and-forget.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::message::ChatId;

#[derive(Debug, Clone, Error)]
pub enum SendError {
    #[error("message delivery failed: {0}")]
    Delivery(String),
}

/// Port for sending replies back to a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver one text message (light HTML markup allowed) to a chat.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), SendError>;
}
