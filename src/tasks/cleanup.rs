//! Expiry Cleanup Task
//!
//! Background task that periodically sweeps expired entries out of every
//! namespace that is due for cleaning.
//!
//! One shared task serves all namespaces, so sweep concurrency stays
//! bounded no matter how fast writes arrive. A namespace is due when it
//! has autoclean enabled, is not unlimited, and its global expiry has
//! elapsed since its last sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::NamespaceRegistry;

/// Spawns the background task that sweeps expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between rounds. Each round takes every due namespace's lock just long
/// enough to sweep it.
///
/// # Arguments
/// * `namespaces` - Shared namespace registry to sweep
/// * `sweep_interval_secs` - Interval in seconds between rounds
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
pub fn spawn_cleanup_task(
    namespaces: Arc<NamespaceRegistry>,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry cleanup task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let mut removed = 0;
            let mut swept = 0;
            for namespace in namespaces.all().await {
                let mut namespace = namespace.lock().await;
                if namespace.due_for_clean() {
                    namespace.mark_cleaned();
                    removed += namespace.sweep_expired();
                    swept += 1;
                }
            }

            if removed > 0 {
                info!(
                    "Expiry cleanup: removed {} entries across {} namespaces",
                    removed, swept
                );
            } else {
                debug!("Expiry cleanup: nothing due");
            }
        }
    })
}
