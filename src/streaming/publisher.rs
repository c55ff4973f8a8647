//! Telemetry publisher using a TCP broadcast socket.
//!
//! The publisher owns the listener and runs on the caller's thread: each
//! publish call first accepts any pending subscribers (non-blocking), then
//! writes the framed message to every connected subscriber. Subscriber
//! sockets are non-blocking: a subscriber whose send buffer is full, or whose
//! connection has failed, is dropped on the spot rather than stalling the
//! frame loop.

use crate::error::{Error, Result};
use crate::frame::TelemetrySample;
use crate::streaming::messages::{TelemetryMessage, unix_timestamp};
use crate::streaming::wire::encode_frame;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};

/// Broadcast endpoint for telemetry messages
pub struct TelemetryPublisher {
    listener: TcpListener,
    local_addr: SocketAddr,
    clients: Vec<TcpStream>,
    /// Reusable buffer for message serialization (avoids allocations)
    buffer: Vec<u8>,
    published: u64,
}

impl TelemetryPublisher {
    /// Bind the broadcast endpoint
    ///
    /// # Arguments
    /// - `bind_address`: TCP bind address (e.g., "0.0.0.0:5555")
    pub fn bind(bind_address: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind_address).map_err(|e| {
            Error::Other(format!("Failed to bind to {}: {}", bind_address, e))
        })?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        info!("Publishing telemetry on tcp://{}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            clients: Vec::new(),
            buffer: Vec::with_capacity(256),
            published: 0,
        })
    }

    /// Address the listener is bound to (resolves port 0 to the real port)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of currently connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.clients.len()
    }

    /// Messages broadcast so far
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Accept every subscriber waiting in the listen backlog
    ///
    /// Returns the number of new subscribers.
    pub fn accept_pending(&mut self) -> usize {
        let mut accepted = 0;
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = Self::configure_client(&stream) {
                        warn!("Failed to configure subscriber {}: {}", addr, e);
                        continue;
                    }
                    info!("Subscriber connected: {}", addr);
                    self.clients.push(stream);
                    accepted += 1;
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    error!("Error accepting subscriber: {}", e);
                    break;
                }
            }
        }
        accepted
    }

    fn configure_client(stream: &TcpStream) -> std::io::Result<()> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(())
    }

    /// Timestamp a decoded sample and broadcast it
    ///
    /// The timestamp is taken here, at publish time, not when the frame
    /// arrived on the serial link.
    pub fn publish(&mut self, sample: &TelemetrySample) -> Result<TelemetryMessage> {
        let message = TelemetryMessage::stamp(sample, unix_timestamp());
        self.broadcast(&message)?;
        Ok(message)
    }

    /// Broadcast any serializable message to all connected subscribers
    pub fn broadcast<T: Serialize>(&mut self, message: &T) -> Result<()> {
        self.accept_pending();
        encode_frame(message, &mut self.buffer)?;

        let frame = &self.buffer;
        self.clients.retain_mut(|client| match client.write_all(frame) {
            Ok(()) => true,
            Err(e) => {
                match client.peer_addr() {
                    Ok(addr) => debug!("Subscriber {} dropped: {}", addr, e),
                    Err(_) => debug!("Subscriber dropped: {}", e),
                }
                let _ = client.shutdown(Shutdown::Both);
                false
            }
        });

        self.published += 1;
        Ok(())
    }
}

impl Drop for TelemetryPublisher {
    fn drop(&mut self) {
        for client in self.clients.drain(..) {
            let _ = client.shutdown(Shutdown::Both);
        }
        info!(
            "Publisher on tcp://{} closed ({} messages published)",
            self.local_addr, self.published
        );
    }
}
