//! Server configuration types for tunebot.
//!
//! `ServerConfig` represents the optional `tunebot.toml` that tunes the
//! agent and the auto loop. All fields have defaults, so an empty or missing
//! file yields a working configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prompt submitted on every auto-mode turn.
pub const DEFAULT_AUTO_PROMPT: &str = "Be creative and do something interesting on the blockchain. Choose an action or set of actions and execute it that highlights your abilities.";

/// Tunables for the agent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Seconds to wait between auto-mode turns.
    #[serde(default = "default_auto_interval_secs")]
    pub auto_interval_secs: u64,

    /// Conversation identifier keying the checkpoint store.
    #[serde(default = "default_thread_id")]
    pub thread_id: String,

    /// Chat model name.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on model calls within one turn.
    #[serde(default = "default_max_agent_steps")]
    pub max_agent_steps: usize,

    #[serde(default = "default_auto_prompt")]
    pub auto_prompt: String,
}

fn default_auto_interval_secs() -> u64 {
    10
}

fn default_thread_id() -> String {
    "tunebot-agent-thread".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_agent_steps() -> usize {
    8
}

fn default_auto_prompt() -> String {
    DEFAULT_AUTO_PROMPT.to_string()
}

impl ServerConfig {
    pub fn auto_interval(&self) -> Duration {
        Duration::from_secs(self.auto_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            auto_interval_secs: default_auto_interval_secs(),
            thread_id: default_thread_id(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            max_agent_steps: default_max_agent_steps(),
            auto_prompt: default_auto_prompt(),
        }
    }
}
