//! State management module
//!
//! This module handles the per-issuer pending-input state machine

pub mod context;
pub mod storage;

// Re-export commonly used state components
pub use context::{ConversationContext, PendingInput};
pub use storage::StateStorage;
