//! Adapters - implementations of the ports against real infrastructure,
//! each shipped with a test double.

pub mod http;
pub mod store;
pub mod stripe;
pub mod telegram;
