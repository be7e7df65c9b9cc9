//! # chainrelay-stream
//!
//! Network listeners and the pipeline engine.
//!
//! ```text
//! Listener (per configured endpoint, Tokio task)
//!       │  fire-and-forget forward
//!       ▼
//! RawEvent channel
//!       │
//!       ▼
//! PipelineEngine: parser dispatch (by family) → processor (dedup)
//!       │
//!       ▼
//! EventPublisher → bus / outbox
//! ```
//!
//! Listeners own their connection and reconnect state and share nothing with
//! each other. Parsing is pure; the store serializes the dedup check.

pub mod engine;
pub mod listener;
pub mod source;
pub mod ws_source;

pub use engine::PipelineEngine;
pub use listener::{Listener, ListenerState};
pub use source::{EventSource, RawEventStream};
pub use ws_source::{EvmWsSource, JsonFrameSource};
