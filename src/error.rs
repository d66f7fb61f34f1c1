//! Error types for the IPC and cache layers
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed frame or header, oversize payload, unexpected envelope
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O failure on the socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload serialization failure
    #[error("Encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Payload deserialization failure
    #[error("Decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Value conversion failure at the call boundary
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Socket missing, connect refused beyond the retry budget, or the
    /// peer went away mid-call
    #[error("Connection error: {0}")]
    Connection(String),

    /// Operation attempted on a client that already disconnected
    #[error("Not connected")]
    NotConnected,

    /// Cache key or namespace not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unknown remote function or duplicate namespace creation
    #[error("Registry error: {0}")]
    Registry(String),

    /// Failure reported by the server for a remote call
    #[error("Remote error: {0}")]
    Remote(String),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
