//! Telegram adapter: webhook payload types, the `Messenger` implementation,
//! and a recording mock for tests.

mod messenger;
mod mock_messenger;
mod types;

pub use messenger::{TelegramMessenger, DEFAULT_API_BASE_URL};
pub use mock_messenger::RecordingMessenger;
pub use types::{Chat, IncomingMessage, Sender, Update};
