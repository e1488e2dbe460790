//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! core and the outside world. Adapters implement these ports.
//!
//! - `CredentialStore` - per-user processor secret persistence
//! - `ProcessorClient` - the payment processor's REST surface
//! - `Messenger` - outbound chat delivery

mod credential_store;
mod messenger;
mod processor;

pub use credential_store::{CredentialStore, StoreError};
pub use messenger::{Messenger, SendError};
pub use processor::{ProcessorClient, ProcessorResponse, TransportError};
