//! # chainrelay-observability
//!
//! Tracing initialisation for the pipeline. Structured logs carry the error
//! taxonomy: transient network trouble at warn, malformed messages at error,
//! unknown event kinds at warn, duplicates not logged as errors at all.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
