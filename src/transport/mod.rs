//! Transport layer for the hardware byte stream

use crate::error::Result;

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Byte source feeding the frame reader
pub trait Transport: Send {
    /// Read available bytes into `buffer`, waiting at most the transport's
    /// read timeout.
    ///
    /// Returns `Ok(0)` when the timeout elapsed with nothing to read. Errors
    /// are terminal for the stream (device unplugged, port closed).
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Discard bytes that arrived before the caller started reading
    fn clear_input(&mut self) -> Result<()>;
}
