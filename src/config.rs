//! Configuration for the sensor node
//!
//! Loads a JSON document describing the serial link and the broadcast
//! endpoint. A missing file is not an error: the node falls back to the
//! built-in defaults so a bench setup works without any config on disk.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default location of the sensor node config, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/sensor_config.json";

/// Top-level sensor node configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SensorConfig {
    pub serial: SerialConfig,
    /// Broadcast endpoint settings (`zmq` key kept for existing config files)
    #[serde(rename = "zmq", alias = "publisher")]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub encoders: EncodersConfig,
    #[serde(default)]
    pub imu: ImuConfig,
}

/// Serial link to the chassis microcontroller
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SerialConfig {
    /// Device path (e.g. `/dev/ttyACM0`)
    pub port: String,
    /// Must match the firmware's UART setting
    pub baud_rate: u32,
    /// Read timeout in seconds
    #[serde(default = "default_serial_timeout")]
    pub timeout: f64,
}

/// Broadcast endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PublisherConfig {
    pub port: u16,
    /// Interface to bind; `*` binds all interfaces
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// Nominal firmware output rate. Informational only, the node publishes
    /// every frame it decodes.
    #[serde(default = "default_publish_rate")]
    pub publish_rate_hz: u32,
}

/// Quadrature encoder wiring, reported at startup
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct EncodersConfig {
    #[serde(default)]
    pub e1: EncoderPins,
    #[serde(default)]
    pub e2: EncoderPins,
}

/// Encoder A/B pin assignment
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct EncoderPins {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_a: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_b: Option<u32>,
}

/// IMU settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ImuConfig {
    pub enabled: bool,
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_serial_timeout() -> f64 {
    1.0
}

fn default_bind_host() -> String {
    "*".to_string()
}

fn default_publish_rate() -> u32 {
    100
}

impl SerialConfig {
    /// Read timeout as a `Duration`. Negative or non-finite values clamp to zero.
    pub fn read_timeout(&self) -> Duration {
        if self.timeout.is_finite() && self.timeout > 0.0 {
            Duration::from_secs_f64(self.timeout)
        } else {
            Duration::ZERO
        }
    }
}

impl PublisherConfig {
    /// Socket address string to bind (`*` maps to all interfaces)
    pub fn bind_address(&self) -> String {
        let host = if self.bind_host == "*" {
            "0.0.0.0"
        } else {
            self.bind_host.as_str()
        };
        format!("{}:{}", host, self.port)
    }

    /// Endpoint as advertised to operators
    pub fn endpoint(&self) -> String {
        format!("tcp://{}:{}", self.bind_host, self.port)
    }
}

impl EncoderPins {
    /// Human-readable pin summary, `N/A` for unset pins
    pub fn describe(&self) -> String {
        fn pin(p: Option<u32>) -> String {
            p.map_or_else(|| "N/A".to_string(), |v| v.to_string())
        }
        format!("A={}, B={}", pin(self.pin_a), pin(self.pin_b))
    }
}

impl SensorConfig {
    /// Parse configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration, falling back to defaults when the file does not exist
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config file not found at {}", path.display());
            log::warn!("Using default configuration");
            return Ok(Self::default());
        }
        log::info!("Using config: {}", path.display());
        Self::from_file(path)
    }

    /// Log the startup summary
    pub fn log_summary(&self) {
        log::info!("Sensor Node Configuration:");
        log::info!(
            "  Serial: {} @ {} baud",
            self.serial.port,
            self.serial.baud_rate
        );
        log::info!("  Publisher: {}", self.publisher.endpoint());
        log::info!("  E1 pins: {}", self.encoders.e1.describe());
        log::info!("  E2 pins: {}", self.encoders.e2.describe());
        log::info!(
            "  IMU: {}",
            if self.imu.enabled {
                "enabled"
            } else {
                "disabled"
            }
        );
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig {
                port: "/dev/cu.usbmodem11401".to_string(),
                baud_rate: 921_600,
                timeout: 1.0,
            },
            publisher: PublisherConfig {
                port: 5555,
                bind_host: default_bind_host(),
                publish_rate_hz: default_publish_rate(),
            },
            encoders: EncodersConfig::default(),
            imu: ImuConfig::default(),
        }
    }
}
