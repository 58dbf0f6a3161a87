//! Conversation checkpoints keyed by thread id.
//!
//! The user message is appended when a turn starts; each model step is
//! appended once it is complete, so the next turn on the same thread replays
//! a history in which every tool call has its result.

use dashmap::DashMap;

use tunebot_types::llm::Message;

/// Storage for per-thread message history.
pub trait CheckpointStore: Send + Sync {
    /// Snapshot of the thread's history (empty for an unknown thread).
    fn load(&self, thread_id: &str) -> Vec<Message>;

    /// Append messages to the end of the thread's history.
    fn append(&self, thread_id: &str, messages: &[Message]);
}

/// Process-lifetime, in-memory checkpoint store.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    threads: DashMap<String, Vec<Message>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages recorded for a thread.
    pub fn len(&self, thread_id: &str) -> usize {
        self.threads.get(thread_id).map(|t| t.len()).unwrap_or(0)
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, thread_id: &str) -> Vec<Message> {
        self.threads
            .get(thread_id)
            .map(|t| t.value().clone())
            .unwrap_or_default()
    }

    fn append(&self, thread_id: &str, messages: &[Message]) {
        self.threads
            .entry(thread_id.to_string())
            .or_default()
            .extend_from_slice(messages);
    }
}
