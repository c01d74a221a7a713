//! Error types for the CNVS hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the device.
#[derive(Error, Debug)]
pub enum Error {
    /// No endpoint matched the CNVS USB identity at discovery.
    #[error("CNVS device not found (VID:PID 3402:0B00/0B01)")]
    NoEndpoint,

    /// Opening the serial port failed.
    #[error("Failed to open {endpoint}: {source}")]
    Open {
        endpoint: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// The handshake write after opening failed.
    #[error("Handshake failed: {0}")]
    Handshake(#[source] Box<Error>),

    /// A write was attempted while the link is down.
    #[error("Serial port not connected")]
    NotConnected,

    /// Serial port enumeration or configuration error.
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// Serial I/O error.
    #[error("Serial I/O error: {0}")]
    Write(#[from] std::io::Error),

    /// Color string is not a `#RRGGBB` triplet.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Unknown lighting mode name.
    #[error("Invalid lighting mode: {0}")]
    InvalidMode(String),
}
