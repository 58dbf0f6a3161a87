//! Infrastructure layer for tunebot.
//!
//! Contains implementations of the ports defined in `tunebot-core`: the
//! OpenAI chat-completions provider, the wallet toolkit, environment
//! validation, the `tunebot.toml` loader, and the env-backed agent factory.

pub mod config;
pub mod env;
pub mod factory;
pub mod llm;
pub mod wallet;
