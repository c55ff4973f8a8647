//! Message types published on the telemetry channel

use crate::frame::TelemetrySample;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Telemetry message as seen by subscribers
///
/// Field order on the wire is `e1`, `e2`, `imu`, `timestamp`. Non-finite
/// sensor values serialize as JSON `null`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TelemetryMessage {
    /// Encoder 1 angle (degrees)
    pub e1: f64,
    /// Encoder 2 angle (degrees)
    pub e2: f64,
    /// IMU heading (degrees)
    pub imu: f64,
    /// Seconds since the Unix epoch, taken when the message was published
    pub timestamp: f64,
}

impl TelemetryMessage {
    /// Attach a timestamp to a decoded sample
    pub fn stamp(sample: &TelemetrySample, timestamp: f64) -> Self {
        Self {
            e1: f64::from(sample.e1_deg),
            e2: f64::from(sample.e2_deg),
            imu: f64::from(sample.imu_heading_deg),
            timestamp,
        }
    }
}

/// Current wall-clock time as fractional seconds since the Unix epoch
pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
