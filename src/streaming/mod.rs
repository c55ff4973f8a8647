//! TCP broadcast streaming
//!
//! A [`TelemetryPublisher`] owns a listening socket and writes every message
//! to each connected [`Subscriber`]. There is no acknowledgement and nothing
//! is queued for subscribers that connect late or fall behind.

pub mod messages;
pub mod publisher;
pub mod subscriber;
pub mod wire;

pub use messages::TelemetryMessage;
pub use publisher::TelemetryPublisher;
pub use subscriber::Subscriber;
pub use wire::MAX_MESSAGE_SIZE;
