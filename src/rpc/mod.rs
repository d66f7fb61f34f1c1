//! RPC Module
//!
//! Unix-socket RPC engine: a function registry, a serving side that
//! dispatches one task per connection, and a calling side with a typed
//! `invoke` surface.

mod client;
mod registry;
mod server;

// Re-export public types
pub use client::IpcClient;
pub use registry::{FunctionRegistry, Handler, HandlerFuture};
pub use server::IpcServer;
