//! Shared domain types for tunebot.
//!
//! This crate contains the types exchanged between the agent endpoint, the
//! session manager, and the chat client: the command envelope, agent output
//! units, provider-agnostic LLM shapes, configuration, and error enums.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod agent;
pub mod command;
pub mod config;
pub mod error;
pub mod llm;
