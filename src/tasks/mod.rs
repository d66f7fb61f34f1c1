//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry Cleanup: Sweeps expired cache entries out of due namespaces
//!   at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
