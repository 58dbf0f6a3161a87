use thiserror::Error;

use crate::llm::LlmError;

/// Errors raised while validating process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variables are unset, in the order they were checked.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors for command envelopes that cannot be routed.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid mode specified")]
    InvalidMode,

    #[error("Message is required in chat mode")]
    MissingMessage,
}

/// Errors from toolkit invocations.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments for '{name}': {message}")]
    InvalidArguments { name: String, message: String },

    #[error("tool '{name}' failed: {message}")]
    Failed { name: String, message: String },
}

/// Errors raised while running an agent turn.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("agent did not finish within {0} steps")]
    StepLimit(usize),
}

/// Errors the session manager reports before a stream is opened.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("agent initialization failed: {0}")]
    Init(String),
}
