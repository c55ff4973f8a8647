//! Publisher discovery by port scanning
//!
//! Each port in the range is probed in turn: connect, wait for one message,
//! close. A port that refuses the connection, stays silent for the whole
//! per-port budget, or sends something that is not a valid frame is left out
//! of the results without any error. Silence is not proof that nothing is
//! there, only that nothing answered in time.
//!
//! The per-port budget covers connect and receive together, so a scan takes
//! at most `ports × timeout` plus name resolution.

use crate::error::{Error, Result};
use crate::registry::PublisherRegistry;
use crate::streaming::Subscriber;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::ops::Range;
use std::time::{Duration, Instant};

/// Default per-port receive budget
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Smallest per-port budget; a zero budget could never connect
pub const MIN_PROBE_TIMEOUT: Duration = Duration::from_millis(1);

/// Default scan range (end exclusive)
pub const DEFAULT_PORT_RANGE: Range<u16> = 5555..5565;

/// Coarse kind of a JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    Other,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Null | Value::Array(_) | Value::Object(_) => ValueKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Other => "other",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the first message received from a publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferredSchema {
    /// Object message: field name → kind, in message order
    Fields(IndexMap<String, ValueKind>),
    /// Anything else
    Scalar(ValueKind),
}

impl InferredSchema {
    pub fn infer(message: &Value) -> Self {
        match message {
            Value::Object(map) => InferredSchema::Fields(
                map.iter()
                    .map(|(k, v)| (k.clone(), ValueKind::of(v)))
                    .collect(),
            ),
            other => InferredSchema::Scalar(ValueKind::of(other)),
        }
    }
}

impl fmt::Display for InferredSchema {
    /// `key:kind, key:kind` for objects, the bare kind otherwise
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredSchema::Fields(fields) => {
                for (i, (name, kind)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}:{}", name, kind)?;
                }
                Ok(())
            }
            InferredSchema::Scalar(kind) => write!(f, "{}", kind),
        }
    }
}

/// A publisher found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryResult {
    /// Registry name for this exact host/port, if any
    pub name: Option<String>,
    pub host: String,
    pub port: u16,
    pub schema: InferredSchema,
}

impl DiscoveryResult {
    /// Registry name, or `-` when the address is not registered
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }
}

/// Sequential port scanner
#[derive(Debug, Clone)]
pub struct DiscoveryScanner {
    host: String,
    ports: Range<u16>,
    timeout: Duration,
}

impl DiscoveryScanner {
    /// `timeout` is the per-port budget, raised to [`MIN_PROBE_TIMEOUT`]
    pub fn new(host: &str, ports: Range<u16>, timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            ports,
            timeout: timeout.max(MIN_PROBE_TIMEOUT),
        }
    }

    /// Probe every port and return live publishers in ascending port order
    ///
    /// The registry is only read, to attach names to results.
    pub fn scan(&self, registry: &PublisherRegistry) -> Vec<DiscoveryResult> {
        let started = Instant::now();
        let mut results = Vec::new();

        for port in self.ports.clone() {
            match self.probe(port) {
                Ok(Some(message)) => {
                    let schema = InferredSchema::infer(&message);
                    log::debug!("Port {} is live: {}", port, schema);
                    results.push(DiscoveryResult {
                        name: registry.name_for(&self.host, port).map(str::to_string),
                        host: self.host.clone(),
                        port,
                        schema,
                    });
                }
                Ok(None) => log::debug!("Port {}: no message within {:?}", port, self.timeout),
                Err(e) => log::debug!("Port {}: {}", port, e),
            }
        }

        log::debug!(
            "Scanned {} ports on {} in {:?}, {} live",
            self.ports.len(),
            self.host,
            started.elapsed(),
            results.len()
        );
        results
    }

    /// Connect to one port and wait for a single message
    ///
    /// The connection is closed when this returns, whatever the outcome.
    pub fn probe(&self, port: u16) -> Result<Option<Value>> {
        let deadline = Instant::now() + self.timeout;
        let addr = resolve(&self.host, port)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        let mut subscriber = Subscriber::connect_timeout(&addr, remaining)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        subscriber.recv_timeout(remaining)
    }
}

/// Resolve `host:port` to the first socket address, preferring IPv4
///
/// Publishers bind IPv4 wildcard addresses, so for `localhost` the IPv4
/// loopback is the one that answers.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| Error::Other(format!("cannot resolve {}", host)))
}
