//! Minimal typed views of Telegram webhook payloads.
//!
//! Only the fields the core consumes are decoded: chat id, sender id, and
//! message text. Everything else in the update is ignored.

use serde::Deserialize;

use crate::domain::message::{ChatId, InboundMessage, UserId};

/// One webhook update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub from: Option<Sender>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
}

impl Update {
    /// Extract the `{chat_id, user_id, text}` triple the core consumes.
    ///
    /// Updates without a message, sender, or text (edits, joins, stickers,
    /// channel posts) yield `None` and are acknowledged without processing.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let sender = message.from?;
        let text = message.text?;
        Some(InboundMessage {
            chat_id: ChatId::new(message.chat.id),
            user_id: UserId::from(sender.id),
            text,
        })
    }
}
