//! Subscriber side of the broadcast channel.
//!
//! Bytes are read into a reassembly buffer and frames are only handed out
//! once complete, so a timeout or a non-blocking poll in the middle of a
//! frame never leaves the stream misaligned.
//!
//! # Example
//!
//! ```ignore
//! use chassis_telemetry::streaming::Subscriber;
//! use std::time::Duration;
//!
//! let mut sub = Subscriber::connect("127.0.0.1:5555")?;
//! if let Some(msg) = sub.recv_timeout(Duration::from_millis(500))? {
//!     println!("{}", msg);
//! }
//! ```

use crate::error::{Error, Result};
use crate::streaming::wire::{decode_payload, frame_length};
use serde_json::Value;
use std::io::Read;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

/// Size of a single socket read
const READ_CHUNK_SIZE: usize = 4096;

/// TCP subscriber to a telemetry publisher
pub struct Subscriber {
    stream: TcpStream,
    peer: SocketAddr,
    pending: Vec<u8>,
    chunk: Box<[u8; READ_CHUNK_SIZE]>,
}

impl Subscriber {
    /// Connect to a publisher (blocking connect)
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream)
    }

    /// Connect to a publisher, giving up after `timeout`
    pub fn connect_timeout(addr: &SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect_timeout(addr, timeout)?;
        Self::from_stream(stream)
    }

    fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            peer,
            pending: Vec::with_capacity(READ_CHUNK_SIZE),
            chunk: Box::new([0u8; READ_CHUNK_SIZE]),
        })
    }

    /// Receive the next message, waiting at most `timeout`
    ///
    /// Returns `Ok(None)` if no complete message arrived in time.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Value>> {
        if let Some(value) = self.take_message()? {
            return Ok(Some(value));
        }

        let deadline = Instant::now() + timeout;
        self.stream.set_nonblocking(false)?;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            self.stream.set_read_timeout(Some(remaining))?;

            if !self.fill()? {
                return Ok(None);
            }
            if let Some(value) = self.take_message()? {
                return Ok(Some(value));
            }
        }
    }

    /// Receive a message if one is already available, without blocking
    pub fn try_recv(&mut self) -> Result<Option<Value>> {
        if let Some(value) = self.take_message()? {
            return Ok(Some(value));
        }

        self.stream.set_nonblocking(true)?;
        while self.fill()? {
            if let Some(value) = self.take_message()? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Read once from the socket into the reassembly buffer
    ///
    /// Returns `Ok(false)` when nothing was available (timeout or would block).
    fn fill(&mut self) -> Result<bool> {
        match self.stream.read(&mut self.chunk[..]) {
            Ok(0) => Err(Error::Disconnected),
            Ok(n) => {
                self.pending.extend_from_slice(&self.chunk[..n]);
                Ok(true)
            }
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock
                        | std::io::ErrorKind::TimedOut
                        | std::io::ErrorKind::Interrupted
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Pop one complete message off the reassembly buffer
    ///
    /// Frames whose payload is not valid JSON are dropped with a warning and
    /// the next frame is tried.
    fn take_message(&mut self) -> Result<Option<Value>> {
        while let Some(end) = frame_length(&self.pending)? {
            let decoded = decode_payload(&self.pending[..end]);
            self.pending.drain(..end);
            match decoded {
                Ok(value) => return Ok(Some(value)),
                Err(e) => log::warn!(
                    "Discarding malformed message from {} ({} bytes): {}",
                    self.peer,
                    end,
                    e
                ),
            }
        }
        Ok(None)
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
        log::debug!("Subscriber connection to {} closed", self.peer);
    }
}
