//! Agent session logic and port definitions for tunebot.
//!
//! This crate defines the "ports" (provider, toolkit, and checkpoint traits)
//! that the infrastructure layer implements, the tool-calling agent built on
//! top of them, the session manager that owns the agent handle and the
//! auto-loop controller, and the client-side transcript model. It depends
//! only on `tunebot-types` -- never on `tunebot-infra` or any network crate.

pub mod agent;
pub mod llm;
pub mod session;
pub mod transcript;
