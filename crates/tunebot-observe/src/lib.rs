//! Observability setup for tunebot: the global tracing subscriber and the
//! optional OpenTelemetry bridge.

pub mod tracing_setup;
