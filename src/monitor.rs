//! Live tail of a single publisher
//!
//! The monitor resolves its target (a literal port, or a registry name),
//! connects, and polls without blocking. When nothing is pending it sleeps
//! for [`IDLE_INTERVAL`] instead of spinning. Each message is printed with a
//! local wall-clock stamp at millisecond precision.

use crate::discovery::resolve;
use crate::error::{Error, Result};
use crate::registry::PublisherRegistry;
use crate::streaming::Subscriber;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Sleep between empty polls
pub const IDLE_INTERVAL: Duration = Duration::from_millis(10);

/// What the operator asked to monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Literal port on the given host
    Port(u16),
    /// Registry name
    Name(String),
}

impl Target {
    /// All-digit input is a port, anything else a registry name
    pub fn parse(input: &str) -> Result<Self> {
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            input
                .parse::<u16>()
                .map(Target::Port)
                .map_err(|_| Error::Other(format!("Invalid port number: {}", input)))
        } else {
            Ok(Target::Name(input.to_string()))
        }
    }
}

/// Resolved publisher address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcp://{}:{}", self.host, self.port)
    }
}

/// Turn a target into an address without touching the network
///
/// `host` applies only to literal ports; registry entries carry their own.
pub fn resolve_target(
    target: &Target,
    host: &str,
    registry: &PublisherRegistry,
) -> Result<Endpoint> {
    match target {
        Target::Port(port) => Ok(Endpoint {
            host: host.to_string(),
            port: *port,
        }),
        Target::Name(name) => registry
            .get(name)
            .map(|record| Endpoint {
                host: record.host.to_string(),
                port: record.port,
            })
            .ok_or_else(|| Error::PublisherNotFound(name.clone())),
    }
}

/// Local time as `HH:MM:SS.mmm`
pub fn timestamp_label(now: &DateTime<Local>) -> String {
    now.format("%H:%M:%S%.3f").to_string()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => format!("{:.4}", n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Format one message for the console
///
/// Objects print a stamp line, one indented `key: value` line per field and
/// a trailing blank line. Floats get four decimals; strings are unquoted.
pub fn render_message(message: &Value, stamp: &str) -> String {
    match message {
        Value::Object(fields) => {
            let mut out = format!("[{}]\n", stamp);
            for (key, value) in fields {
                out.push_str(&format!("  {}: {}\n", key, render_value(value)));
            }
            out.push('\n');
            out
        }
        other => format!("[{}] {}\n\n", stamp, render_value(other)),
    }
}

/// Subscription to one publisher that prints what it receives
pub struct StreamMonitor {
    endpoint: Endpoint,
    subscriber: Subscriber,
    received: u64,
}

impl StreamMonitor {
    /// Connect to the publisher at `endpoint`
    pub fn connect(endpoint: Endpoint) -> Result<Self> {
        let addr = resolve(&endpoint.host, endpoint.port)?;
        let subscriber = Subscriber::connect(addr)?;
        log::debug!("Connected to {} ({})", endpoint, addr);
        Ok(Self {
            endpoint,
            subscriber,
            received: 0,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Messages printed so far
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Print one pending message, if any, without blocking
    ///
    /// Returns `true` if a message was printed.
    pub fn poll<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        match self.subscriber.try_recv()? {
            Some(message) => {
                let stamp = timestamp_label(&Local::now());
                out.write_all(render_message(&message, &stamp).as_bytes())?;
                out.flush()?;
                self.received += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Poll until `running` is cleared or the publisher goes away
    pub fn run<W: Write>(&mut self, out: &mut W, running: &AtomicBool) -> Result<u64> {
        while running.load(Ordering::Relaxed) {
            if !self.poll(out)? {
                std::thread::sleep(IDLE_INTERVAL);
            }
        }
        Ok(self.received)
    }
}
