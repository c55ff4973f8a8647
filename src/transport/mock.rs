//! Scripted transport for tests and bench runs without hardware

use super::Transport;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Mock transport with a scripted read sequence
///
/// Each injected chunk is delivered by at most one `read` call, so a chunk
/// shorter than a frame behaves like a serial read that returned early.
/// Cloning shares the script, letting a test keep a handle after the
/// transport has been moved into a reader.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    /// Bytes already buffered before the reader started
    stale: Vec<u8>,
    script: VecDeque<Step>,
    /// Once the script runs out: `true` fails reads, `false` times out
    closed: bool,
    clears: usize,
}

enum Step {
    Data(VecDeque<u8>),
    Timeout,
}

impl MockTransport {
    /// Create a new mock transport with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load bytes that a `clear_input` call will discard
    pub fn inject_stale(&self, data: &[u8]) {
        self.inner.lock().stale.extend_from_slice(data);
    }

    /// Queue a chunk to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.inner
            .lock()
            .script
            .push_back(Step::Data(data.iter().copied().collect()));
    }

    /// Queue a read that times out with no data
    pub fn inject_timeout(&self) {
        self.inner.lock().script.push_back(Step::Timeout);
    }

    /// Make reads fail once the script is exhausted (device unplugged)
    pub fn close(&self) {
        self.inner.lock().closed = true;
    }

    /// Number of `clear_input` calls so far
    pub fn clear_count(&self) -> usize {
        self.inner.lock().clears
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();

        if !inner.stale.is_empty() {
            let n = inner.stale.len().min(buffer.len());
            buffer[..n].copy_from_slice(&inner.stale[..n]);
            inner.stale.drain(..n);
            return Ok(n);
        }

        match inner.script.pop_front() {
            Some(Step::Timeout) => Ok(0),
            Some(Step::Data(mut chunk)) => {
                let n = chunk.len().min(buffer.len());
                for (slot, byte) in buffer.iter_mut().zip(chunk.drain(..n)) {
                    *slot = byte;
                }
                if !chunk.is_empty() {
                    inner.script.push_front(Step::Data(chunk));
                }
                Ok(n)
            }
            None if inner.closed => Err(Error::Disconnected),
            None => Ok(0),
        }
    }

    fn clear_input(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.stale.clear();
        inner.clears += 1;
        Ok(())
    }
}
