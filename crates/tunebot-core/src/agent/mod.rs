//! The conversational agent as seen by the session layer.
//!
//! An [`Agent`] accepts one turn (a user message on a conversation thread)
//! and yields [`OutputUnit`]s as they are produced. The session manager only
//! ever talks to this trait; [`tool_agent::ToolAgent`] is the production
//! implementation built from an LLM provider, a toolkit, and a checkpoint
//! store.

pub mod checkpoint;
pub mod tool_agent;
pub mod toolkit;

use std::pin::Pin;

use futures_util::Stream;

use tunebot_types::agent::{OutputUnit, ToolDefinition};
use tunebot_types::error::AgentError;

/// Ordered output of a single turn.
pub type UnitStream = Pin<Box<dyn Stream<Item = Result<OutputUnit, AgentError>> + Send + 'static>>;

/// A stateful conversational agent.
///
/// Object-safe so the session manager can hold it as `Arc<dyn Agent>`.
pub trait Agent: Send + Sync {
    /// Submit `message` as one turn on `thread_id` and stream its output.
    ///
    /// The stream ends after the last unit of the turn, or after the first
    /// error.
    fn stream_turn(&self, thread_id: &str, message: &str) -> UnitStream;

    /// Tool integrations available to the agent.
    fn tools(&self) -> Vec<ToolDefinition>;
}
