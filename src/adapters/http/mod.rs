//! HTTP adapter - the inbound webhook surface.

mod webhook;

pub use webhook::{router, AppState};
