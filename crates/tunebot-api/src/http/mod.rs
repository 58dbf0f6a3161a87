//! HTTP layer for tunebot.
//!
//! Axum-based API: `POST /api/agent` (chat/auto streams and the stop action)
//! and `GET /health`, with CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod router;
