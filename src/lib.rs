//! Chassis telemetry - serial sensor frames onto a TCP broadcast bus
//!
//! ## Components
//!
//! - [`frame`]: fixed 12-byte encoder/IMU frames read from a [`transport`]
//! - [`streaming`]: length-prefixed JSON broadcast (publisher and subscriber)
//! - [`node`]: the frame reader wired to a publisher
//! - [`registry`]: named publisher addresses persisted as JSON
//! - [`discovery`]: port-range scan with schema inference
//! - [`monitor`]: live tail of one publisher
//! - [`report`]: console tables for the registry and scan results

pub mod config;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod monitor;
pub mod node;
pub mod registry;
pub mod report;
pub mod streaming;
pub mod transport;

// Re-export commonly used types
pub use config::SensorConfig;
pub use discovery::{DiscoveryResult, DiscoveryScanner, InferredSchema, ValueKind};
pub use error::{Error, Result};
pub use frame::{FRAME_SIZE, FrameReader, TelemetrySample};
pub use monitor::{Endpoint, StreamMonitor, Target};
pub use node::SensorNode;
pub use registry::PublisherRegistry;
pub use streaming::{Subscriber, TelemetryMessage, TelemetryPublisher};
