//! Tillbot - chat-driven payment operations.
//!
//! Bridges Telegram commands to multi-step Stripe call chains: card
//! authorization, validation charges, invoicing, payment links, and direct
//! payment intents, gated by a per-user processor credential.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
