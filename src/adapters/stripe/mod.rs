//! Stripe adapter: the `ProcessorClient` implementation plus a scripted mock
//! for tests.

mod client;
mod mock_processor;

pub use client::{StripeClient, DEFAULT_API_BASE_URL};
pub use mock_processor::{MockProcessor, RecordedCall};
