//! # Conversation Core
//!
//! - [`session`]: the session record and its append-only transcript
//! - [`orchestrator`]: the turn state machine driving provider calls,
//!   tool policy and tool execution
//! - [`error`]: errors that abort a turn

pub mod error;
pub mod orchestrator;
pub mod session;

pub use error::TurnError;
pub use orchestrator::{ConversationOrchestrator, TurnOutcome};
pub use session::{ConversationSession, MessageKind, Sender, TurnMessage, TurnState};
