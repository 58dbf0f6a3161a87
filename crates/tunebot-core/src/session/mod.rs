//! The streaming session protocol.
//!
//! [`manager::SessionManager`] owns the lazily created agent handle and the
//! auto-loop controller slot, routes commands, and turns agent output into
//! ordered line streams.

pub mod controller;
pub mod lines;
pub mod manager;
