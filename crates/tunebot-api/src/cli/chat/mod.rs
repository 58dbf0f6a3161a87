//! Interactive terminal client.
//!
//! Entry point: `loop_runner::run_chat_loop`. The client keeps a
//! [`tunebot_core::transcript::ClientModel`] and renders every new entry as
//! it arrives.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
