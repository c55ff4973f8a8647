//! Fixed-size telemetry frames from the chassis microcontroller
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────────┐
//! │ e1 (f32 LE)  │ e2 (f32 LE)  │ imu heading (LE) │
//! │ bytes 0..4   │ bytes 4..8   │ bytes 8..12      │
//! └──────────────┴──────────────┴──────────────────┘
//! ```
//!
//! There is no sync word, length or checksum: alignment relies on the fixed
//! 12-byte size, so any read that does not produce exactly 12 bytes is
//! dropped. Values are passed through untouched, NaN and infinities included.

use crate::error::Result;
use crate::transport::Transport;

/// Size of one frame on the wire
pub const FRAME_SIZE: usize = 12;

/// One decoded sensor reading
///
/// Angles are in degrees as reported by the firmware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// Encoder 1 angle
    pub e1_deg: f32,
    /// Encoder 2 angle
    pub e2_deg: f32,
    /// IMU heading
    pub imu_heading_deg: f32,
}

impl TelemetrySample {
    pub fn new(e1_deg: f32, e2_deg: f32, imu_heading_deg: f32) -> Self {
        Self {
            e1_deg,
            e2_deg,
            imu_heading_deg,
        }
    }

    /// Decode a frame. Returns `None` unless `bytes` is exactly one frame long.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let frame: &[u8; FRAME_SIZE] = bytes.try_into().ok()?;
        let field =
            |i: usize| f32::from_le_bytes([frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]);
        Some(Self {
            e1_deg: field(0),
            e2_deg: field(4),
            imu_heading_deg: field(8),
        })
    }

    /// Encode into wire order (used by simulators and tests)
    pub fn encode(&self) -> [u8; FRAME_SIZE] {
        let mut out = [0u8; FRAME_SIZE];
        out[0..4].copy_from_slice(&self.e1_deg.to_le_bytes());
        out[4..8].copy_from_slice(&self.e2_deg.to_le_bytes());
        out[8..12].copy_from_slice(&self.imu_heading_deg.to_le_bytes());
        out
    }

    /// Console line in the firmware bring-up format
    pub fn summary(&self) -> String {
        format!(
            "E1: {:6.2}° | E2: {:6.2}° | IMU: {:6.2}°",
            self.e1_deg, self.e2_deg, self.imu_heading_deg
        )
    }
}

/// Counters kept by the frame reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames decoded successfully
    pub decoded: u64,
    /// Reads that came back short and were dropped
    pub discarded: u64,
    /// Read attempts that timed out with no bytes at all
    pub idle: u64,
}

/// Assembles fixed-size frames from a byte stream
///
/// Each call to [`FrameReader::read_frame`] performs one bounded read
/// attempt. The transport's read timeout bounds how long a single attempt
/// may block.
pub struct FrameReader<T: Transport> {
    transport: T,
    buffer: [u8; FRAME_SIZE],
    cleared: bool,
    stats: FrameStats,
}

impl<T: Transport> FrameReader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: [0u8; FRAME_SIZE],
            cleared: false,
            stats: FrameStats::default(),
        }
    }

    /// Read one frame
    ///
    /// Returns `Ok(None)` when fewer than [`FRAME_SIZE`] bytes arrived before
    /// the transport timed out; the partial bytes are dropped and the caller
    /// simply tries again. Transport errors are returned as-is and end the
    /// stream.
    ///
    /// Stale input buffered before the first call is discarded so that a
    /// reset of the microcontroller does not leave the stream misaligned.
    pub fn read_frame(&mut self) -> Result<Option<TelemetrySample>> {
        if !self.cleared {
            self.transport.clear_input()?;
            self.cleared = true;
        }

        let mut filled = 0;
        while filled < FRAME_SIZE {
            let n = self.transport.read(&mut self.buffer[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        match TelemetrySample::decode(&self.buffer[..filled]) {
            Some(sample) => {
                self.stats.decoded += 1;
                Ok(Some(sample))
            }
            None if filled == 0 => {
                self.stats.idle += 1;
                Ok(None)
            }
            None => {
                log::debug!("Discarding short frame ({} of {} bytes)", filled, FRAME_SIZE);
                self.stats.discarded += 1;
                Ok(None)
            }
        }
    }

    /// Decode/discard counters
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

}
