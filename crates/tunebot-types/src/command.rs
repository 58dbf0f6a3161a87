//! Command envelope accepted by `POST /api/agent`.
//!
//! Every field accepts any JSON value: strings are taken as-is and other
//! non-null values are kept as their JSON text. Unsupported values reach
//! [`AgentCommand::route`] and are reported as [`CommandError`]s instead of
//! failing JSON extraction.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// The only recognized `action` value.
pub const STOP_ACTION: &str = "stop";

/// Operating mode of a streaming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One user-driven turn.
    Chat,
    /// Unattended loop until stopped.
    Auto,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Chat => write!(f, "chat"),
            Mode::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for Mode {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Mode::Chat),
            "auto" => Ok(Mode::Auto),
            _ => Err(CommandError::InvalidMode),
        }
    }
}

/// Request body for the agent endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCommand {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub mode: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// What the endpoint should do with a validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Cancel the running auto loop, if any.
    Stop,
    /// Run one turn with the given user message.
    Chat { message: String },
    /// Start the auto loop.
    Auto,
}

impl AgentCommand {
    /// A chat-mode command carrying `message`.
    pub fn chat(message: impl Into<String>) -> Self {
        Self {
            mode: Some(Mode::Chat.to_string()),
            message: Some(message.into()),
            action: None,
        }
    }

    /// An auto-mode start command.
    pub fn auto() -> Self {
        Self {
            mode: Some(Mode::Auto.to_string()),
            ..Default::default()
        }
    }

    /// A stop command.
    pub fn stop() -> Self {
        Self {
            action: Some(STOP_ACTION.to_string()),
            ..Default::default()
        }
    }

    /// Whether this command carries the stop action.
    pub fn is_stop(&self) -> bool {
        self.action.as_deref() == Some(STOP_ACTION)
    }

    /// Validate the command and decide what to do with it.
    ///
    /// The stop action wins over any mode. Other action values are ignored.
    pub fn route(&self) -> Result<Route, CommandError> {
        if self.is_stop() {
            return Ok(Route::Stop);
        }

        let mode: Mode = self
            .mode
            .as_deref()
            .ok_or(CommandError::InvalidMode)?
            .parse()?;

        match mode {
            Mode::Chat => match self.message.as_deref() {
                Some(message) if !message.trim().is_empty() => Ok(Route::Chat {
                    message: message.to_string(),
                }),
                _ => Err(CommandError::MissingMessage),
            },
            Mode::Auto => Ok(Route::Auto),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AgentCommand {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_stop_action_routes_to_stop() {
        assert_eq!(parse(r#"{"action":"stop"}"#).route().unwrap(), Route::Stop);
    }

    #[test]
    fn test_stop_wins_over_mode() {
        let cmd = parse(r#"{"mode":"chat","message":"hi","action":"stop"}"#);
        assert_eq!(cmd.route().unwrap(), Route::Stop);
    }

    #[test]
    fn test_chat_with_message() {
        let cmd = parse(r#"{"mode":"chat","message":"hello"}"#);
        assert_eq!(
            cmd.route().unwrap(),
            Route::Chat {
                message: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_chat_without_message_is_rejected() {
        let err = parse(r#"{"mode":"chat"}"#).route().unwrap_err();
        assert!(matches!(err, CommandError::MissingMessage));
    }

    #[test]
    fn test_chat_with_blank_message_is_rejected() {
        let err = parse(r#"{"mode":"chat","message":"   "}"#).route().unwrap_err();
        assert!(matches!(err, CommandError::MissingMessage));
    }

    #[test]
    fn test_auto_mode() {
        assert_eq!(parse(r#"{"mode":"auto"}"#).route().unwrap(), Route::Auto);
    }

    #[test]
    fn test_unknown_mode_is_invalid() {
        let err = parse(r#"{"mode":"other"}"#).route().unwrap_err();
        assert_eq!(err.to_string(), "Invalid mode specified");
    }

    #[test]
    fn test_missing_mode_is_invalid() {
        let err = parse("{}").route().unwrap_err();
        assert!(matches!(err, CommandError::InvalidMode));
    }

    #[test]
    fn test_non_string_mode_is_invalid() {
        let err = parse(r#"{"mode":123}"#).route().unwrap_err();
        assert_eq!(err.to_string(), "Invalid mode specified");

        let err = parse(r#"{"mode":["chat"]}"#).route().unwrap_err();
        assert!(matches!(err, CommandError::InvalidMode));
    }

    #[test]
    fn test_null_fields_count_as_missing() {
        let err = parse(r#"{"mode":"chat","message":null,"action":null}"#)
            .route()
            .unwrap_err();
        assert!(matches!(err, CommandError::MissingMessage));
    }

    #[test]
    fn test_non_string_action_is_ignored() {
        let cmd = parse(r#"{"mode":"auto","action":true}"#);
        assert_eq!(cmd.route().unwrap(), Route::Auto);
    }

    #[test]
    fn test_unknown_action_falls_through_to_mode() {
        let cmd = parse(r#"{"mode":"auto","action":"pause"}"#);
        assert_eq!(cmd.route().unwrap(), Route::Auto);
    }

    #[test]
    fn test_constructors_serialize_minimal_bodies() {
        assert_eq!(
            serde_json::to_string(&AgentCommand::stop()).unwrap(),
            r#"{"action":"stop"}"#
        );
        assert_eq!(
            serde_json::to_string(&AgentCommand::auto()).unwrap(),
            r#"{"mode":"auto"}"#
        );
        assert_eq!(
            serde_json::to_string(&AgentCommand::chat("hi")).unwrap(),
            r#"{"mode":"chat","message":"hi"}"#
        );
    }
}
