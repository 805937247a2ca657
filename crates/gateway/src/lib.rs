//! The conversation driver: routes each inbound message to the step
//! handler matching the session's current state, renders outbound
//! instructions through a chat transport, and owns the process surface
//! (CLI, config loading, Telegram long-polling).

pub mod channels;
pub mod cli;
pub mod engine;
pub mod outbound;
pub mod prompts;
pub mod telegram;

pub use engine::{Engine, Inbound};
pub use outbound::{deliver_all, ChatTransport, Outbound};
