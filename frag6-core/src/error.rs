//! Error types for frag6

use thiserror::Error;

/// Result type alias for frag6 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for frag6
///
/// Every failure in the build-and-send pipeline surfaces as one of these
/// variants; nothing is retried and nothing is swallowed. Transmission
/// failures carry the index of the fragment that could not be sent, since
/// the remaining fragments of a datagram are never sent after an error.
#[derive(Error, Debug)]
pub enum Error {
    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration (MTU, option sizes, addresses)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Interface query or channel error
    #[error("Interface error: {0}")]
    Interface(String),

    /// Target name or literal could not be resolved to an IPv6 address
    #[error("Address resolution error: {0}")]
    Resolution(String),

    /// Packet construction error
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),

    /// Per-fragment send failure; no further fragments are sent
    #[error("Transmission of fragment {index} failed: {reason}")]
    Transmission { index: usize, reason: String },
}

impl Error {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a packet construction error with a custom message
    pub fn construction<S: Into<String>>(msg: S) -> Self {
        Error::PacketConstruction(msg.into())
    }

    /// Create a resolution error with a custom message
    pub fn resolution<S: Into<String>>(msg: S) -> Self {
        Error::Resolution(msg.into())
    }
}
