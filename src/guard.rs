//! Run-at-most-once activation guard
//!
//! The guard is an ordinary value owned by the composition root and shared
//! through `Arc` where several entry points need it.

use std::future::Future;

use dashmap::DashSet;

/// Id of the locate-and-download flow the CLI runs
pub const DOWNLOAD_ALL: &str = "download-all";

#[derive(Default)]
pub struct ActivationGuard {
    active: DashSet<String>,
}

impl ActivationGuard {
    pub fn new() -> ActivationGuard {
        ActivationGuard::default()
    }

    /// Whether `pipeline_id` has already been activated
    pub fn is_active(&self, pipeline_id: &str) -> bool {
        self.active.contains(pipeline_id)
    }

    /// Runs `activation` only on the first call for `pipeline_id`
    ///
    /// The flag is set before `activation` starts and is never cleared, so
    /// later calls return `None` even if the first run failed or is still in
    /// flight.
    pub async fn activate_once<F, Fut, T>(&self, pipeline_id: &str, activation: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.active.insert(pipeline_id.to_string()) {
            tracing::debug!("\"{}\" is already active, skipping", pipeline_id);
            return None;
        }

        tracing::info!("activating \"{}\"", pipeline_id);
        Some(activation().await)
    }
}
