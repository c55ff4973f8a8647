//! Sensor node: serial frames in, broadcast telemetry out
//!
//! ```text
//! serial ──▶ FrameReader ──▶ TelemetryPublisher ──▶ subscribers
//!                 │
//!                 └─ short reads dropped, loop continues
//! ```
//!
//! Everything runs on the calling thread. The loop checks the shutdown flag
//! between frame reads, so an interrupt is honoured within one serial read
//! timeout. The reader and publisher are owned by the node and released on
//! drop, whichever way the loop ends.

use crate::error::Result;
use crate::frame::{FrameReader, FrameStats, TelemetrySample};
use crate::streaming::TelemetryPublisher;
use crate::transport::Transport;
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};

/// How often (in published messages) to log throughput at debug level
const STATS_LOG_INTERVAL: u64 = 1000;

/// Counters reported when the node stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub frames: FrameStats,
    pub published: u64,
}

/// Frame reader wired to a publisher
pub struct SensorNode<T: Transport> {
    reader: FrameReader<T>,
    publisher: TelemetryPublisher,
    echo: bool,
}

impl<T: Transport> SensorNode<T> {
    pub fn new(transport: T, publisher: TelemetryPublisher) -> Self {
        Self {
            reader: FrameReader::new(transport),
            publisher,
            echo: false,
        }
    }

    /// Print each decoded sample to stdout
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Read and publish at most one frame
    ///
    /// Returns the sample that was published, or `None` for a dropped read.
    pub fn step(&mut self) -> Result<Option<TelemetrySample>> {
        let Some(sample) = self.reader.read_frame()? else {
            return Ok(None);
        };

        self.publisher.publish(&sample)?;
        if self.echo {
            println!("{}", sample.summary());
        }

        let published = self.publisher.published();
        if published % STATS_LOG_INTERVAL == 0 {
            debug!(
                "Published {} samples ({} subscribers, {} short reads)",
                published,
                self.publisher.subscriber_count(),
                self.reader.stats().discarded
            );
        }
        Ok(Some(sample))
    }

    /// Run until `running` is cleared or the stream fails
    ///
    /// A stream error ends the run and is returned after the final counters
    /// are logged.
    pub fn run(&mut self, running: &AtomicBool) -> Result<NodeStats> {
        info!("Sensor node running. Press Ctrl-C to stop.");

        let outcome = loop {
            if !running.load(Ordering::Relaxed) {
                info!("Shutdown requested");
                break Ok(());
            }
            if let Err(e) = self.step() {
                error!("Telemetry stream ended: {}", e);
                break Err(e);
            }
        };

        let stats = self.stats();
        info!(
            "Frames decoded: {}, discarded: {}, published: {} ({} idle reads)",
            stats.frames.decoded, stats.frames.discarded, stats.published, stats.frames.idle
        );
        outcome.map(|()| stats)
    }

    pub fn stats(&self) -> NodeStats {
        NodeStats {
            frames: self.reader.stats(),
            published: self.publisher.published(),
        }
    }
}
