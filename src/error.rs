//! Error types for chassis telemetry

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Chassis telemetry error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error (open or configure)
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Incoming message length exceeds the wire limit
    #[error("Message too large: {0} bytes")]
    FrameTooLarge(usize),

    /// Peer or device closed the stream
    #[error("Connection closed")]
    Disconnected,

    /// Name lookup in the publisher registry failed
    #[error("Publisher '{0}' not found in database")]
    PublisherNotFound(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True when the error means the remote end or device went away.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::Disconnected => true,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
