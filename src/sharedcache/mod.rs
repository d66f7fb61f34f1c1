//! Shared Cache Module
//!
//! The cache service built on the RPC engine: a server exposing namespace
//! lifecycle and get/put/invalidate/stats operations, a typed client for
//! the full operation surface, and a map-like wrapper bound to a single
//! namespace.

mod client;
mod handlers;
mod server;

// Re-export public types
pub use client::{CacheClient, SharedCache};
pub use server::CacheServer;
