//! Shared fixtures: background publishers and port helpers

use chassis_telemetry::frame::TelemetrySample;
use chassis_telemetry::streaming::TelemetryPublisher;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Interval between messages from a background publisher
pub const PUBLISH_INTERVAL: Duration = Duration::from_millis(20);

/// Publisher running on its own thread until dropped
pub struct BackgroundPublisher {
    port: u16,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl BackgroundPublisher {
    /// Take over an already bound publisher and start publishing
    pub fn start(mut publisher: TelemetryPublisher) -> Self {
        let port = publisher.local_addr().port();
        let running = Arc::new(AtomicBool::new(true));
        let r = Arc::clone(&running);

        let handle = thread::spawn(move || {
            let mut tick = 0u32;
            while r.load(Ordering::Relaxed) {
                let sample = TelemetrySample::new(tick as f32, -(tick as f32), 90.0);
                publisher
                    .publish(&sample)
                    .expect("publish to loopback subscribers");
                tick += 1;
                thread::sleep(PUBLISH_INTERVAL);
            }
            publisher.published()
        });

        Self {
            port,
            running,
            handle: Some(handle),
        }
    }

    /// Bind on an ephemeral loopback port and start publishing
    pub fn spawn() -> Self {
        Self::start(TelemetryPublisher::bind("127.0.0.1:0").expect("bind publisher"))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stop publishing and close every subscriber connection
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.running.store(false, Ordering::Relaxed);
        self.handle
            .take()
            .map(|h| h.join().expect("publisher thread panicked"))
            .unwrap_or(0)
    }
}

impl Drop for BackgroundPublisher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Two publishers bound `gap` ports apart on loopback
///
/// Retries with fresh ephemeral ports until the second bind succeeds.
pub fn publisher_pair(gap: u16) -> (TelemetryPublisher, TelemetryPublisher) {
    for _ in 0..50 {
        let first = TelemetryPublisher::bind("127.0.0.1:0").expect("bind publisher");
        let base = first.local_addr().port();
        let Some(second_port) = base.checked_add(gap) else {
            continue;
        };
        if let Ok(second) = TelemetryPublisher::bind(&format!("127.0.0.1:{}", second_port)) {
            return (first, second);
        }
    }
    panic!("could not find two free ports {} apart", gap);
}

/// Keep a port open but never send anything on it
pub fn silent_listener(port: u16) -> Option<TcpListener> {
    TcpListener::bind(("127.0.0.1", port)).ok()
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
