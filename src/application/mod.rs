//! Application layer: the workflow orchestrator and command handling.
//!
//! - `orchestrator` - the multi-step payment call chains
//! - `handler` - command routing, credential gate, reply delivery
//! - `replies` - user-facing reply text builders

pub mod handler;
pub mod orchestrator;
pub mod replies;

pub use handler::CommandHandler;
pub use orchestrator::{
    PaymentOrchestrator, WorkflowError, WorkflowResult, WorkflowStep, RAW_CARD_DATA_NOTICE,
};
