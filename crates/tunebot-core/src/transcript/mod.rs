//! Client-side transcript model.
//!
//! The terminal client appends every received line to a [`Transcript`] and
//! drives a [`ClientModel`] through its send/auto/stop lifecycle. Rendering
//! splits agent entries into prose and fenced code segments.

pub mod render;
pub mod state;

pub use render::{RenderedEntry, Segment, render_entry};
pub use state::{ClientModel, ClientRejection, ClientState, StreamKind};

/// Marker prefixed to user entries.
pub const USER_PREFIX: &str = "You: ";
/// Marker prefixed to chat-mode agent entries.
pub const AGENT_PREFIX: &str = "Agent: ";
/// Marker prefixed to local system notices.
pub const SYSTEM_PREFIX: &str = "System: ";

/// Append-only list of display entries, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, message: &str) {
        self.entries.push(format!("{USER_PREFIX}{message}"));
    }

    pub fn push_agent(&mut self, chunk: &str) {
        self.entries.push(format!("{AGENT_PREFIX}{chunk}"));
    }

    /// Auto-mode chunks are stored as received.
    pub fn push_raw(&mut self, chunk: &str) {
        self.entries.push(chunk.to_string());
    }

    pub fn push_system(&mut self, message: &str) {
        self.entries.push(format!("{SYSTEM_PREFIX}{message}"));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
