//! Agent output types and the fixed wire lines of the session protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Line written after every auto-mode turn.
pub const TURN_SEPARATOR: &str = "-------------------";

/// Terminal line of an auto-mode stream that ended through the stop action.
pub const AUTO_STOPPED_LINE: &str = "Auto mode stopped.";

/// Confirmation returned by the stop action.
pub const STOP_CONFIRMATION: &str = "Auto mode stopped";

/// Which part of the agent produced an output unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSource {
    /// A message from the model itself.
    Agent,
    /// The result of a tool invocation.
    Tools,
}

impl fmt::Display for UnitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSource::Agent => write!(f, "agent"),
            UnitSource::Tools => write!(f, "tools"),
        }
    }
}

/// One incremental piece of agent output within a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputUnit {
    pub source: UnitSource,
    pub text: String,
}

impl OutputUnit {
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            source: UnitSource::Agent,
            text: text.into(),
        }
    }

    pub fn tools(text: impl Into<String>) -> Self {
        Self {
            source: UnitSource::Tools,
            text: text.into(),
        }
    }

    /// The wire form: raw text, newline-terminated. The source is not sent.
    pub fn to_line(&self) -> String {
        format!("{}\n", self.text)
    }
}

/// Format an in-stream error line.
pub fn error_line(message: &str) -> String {
    format!("Error: {message}\n")
}

/// Description of a tool the agent can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool's arguments object.
    pub parameters: serde_json::Value,
}
