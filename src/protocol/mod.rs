//! Wire Protocol Module
//!
//! Frames serializable values into length-prefixed MessagePack messages
//! and defines the request/response envelope exchanged over the socket.

mod frame;
mod message;

// Re-export public types
pub use frame::{encode, receive, send, HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use message::{CallParams, Lookup, Message};
