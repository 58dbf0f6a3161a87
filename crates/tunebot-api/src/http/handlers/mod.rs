//! HTTP route handlers.

pub mod agent;
