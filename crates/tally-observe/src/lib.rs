//! Observability for Tally: structured logging and optional OpenTelemetry
//! trace export.

pub mod tracing_setup;

pub use tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
