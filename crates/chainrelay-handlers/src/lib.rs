//! # chainrelay-handlers
//!
//! Consumers on the far side of the bus. Each handler implements the
//! `EventHandler` trait from `chainrelay-core`; the [`Dispatcher`] fans one
//! event out to all of them, isolating failures so a broken webhook endpoint
//! never starves the notification writer.

mod dispatcher;
mod logging;
mod notification;
mod relay;
mod webhook;

pub use dispatcher::Dispatcher;
pub use logging::LoggingHandler;
pub use notification::NotificationHandler;
pub use relay::{RelayConsumer, RelayKind, RelaySink};
pub use webhook::{WebhookHandler, SIGNATURE_HEADER};
