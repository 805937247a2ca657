//! Session management for tourbot.
//!
//! Holds the conversation state machine, the per-user session record,
//! the key-value store abstraction it persists into, and the per-user
//! lock map that serializes read-modify-write cycles.

pub mod kv;
pub mod lock;
pub mod session;
pub mod state;
pub mod store;

pub use kv::{FileKv, KvStore, MemoryKv};
pub use lock::UserLockMap;
pub use session::Session;
pub use state::{apply, SessionState, Trigger};
pub use store::SessionStore;
