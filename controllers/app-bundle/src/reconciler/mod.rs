//! Reconciliation logic for AppBundle resources.
//!
//! One reconciliation cycle is fetch -> render -> parse -> apply -> report,
//! scoped to a single AppBundle and a single invocation. The cycle keeps all
//! of its intermediate state (archive bytes, rendered text, parsed manifests)
//! in locals; the only cross-cycle state is the per-resource backoff map
//! consumed by the watcher's error policy.

mod app_bundle;

use crate::backoff::FibonacciBackoff;
use crate::store::ClusterStore;
use bundle_source::{BundleFetcher, ChartRenderer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Backoff state for a resource
#[derive(Debug, Clone)]
struct BackoffState {
    backoff: FibonacciBackoff,
    error_count: u32,
}

impl BackoffState {
    fn new() -> Self {
        Self {
            backoff: FibonacciBackoff::new(1, 10), // 1 minute min, 10 minutes max
            error_count: 0,
        }
    }

    fn increment_error(&mut self) {
        self.error_count += 1;
    }

    fn reset(&mut self) {
        self.error_count = 0;
        self.backoff.reset();
    }
}

/// Reconciles AppBundle resources.
///
/// The fetcher, renderer and store capabilities are injected so alternate
/// chart sources, rendering strategies and storage backends can be
/// substituted without touching the cycle itself.
pub struct Reconciler {
    pub(crate) fetcher: Box<dyn BundleFetcher + Send + Sync>,
    pub(crate) renderer: Box<dyn ChartRenderer + Send + Sync>,
    pub(crate) store: Box<dyn ClusterStore + Send + Sync>,
    /// Error count tracking per resource (namespace/name -> BackoffState)
    backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(
        fetcher: impl BundleFetcher + Send + Sync + 'static,
        renderer: impl ChartRenderer + Send + Sync + 'static,
        store: impl ClusterStore + Send + Sync + 'static,
    ) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            renderer: Box::new(renderer),
            store: Box::new(store),
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get the Fibonacci backoff duration for a resource based on its error count
    ///
    /// Returns (backoff_seconds, error_count)
    pub fn get_backoff_for_resource(&self, resource_key: &str) -> (u64, u32) {
        match self.backoff_states.lock() {
            Ok(mut states) => {
                let state = states
                    .entry(resource_key.to_string())
                    .or_insert_with(BackoffState::new);
                let backoff_seconds = state.backoff.next_backoff_seconds();
                let error_count = state.error_count;
                (backoff_seconds, error_count)
            }
            Err(e) => {
                warn!("Failed to lock backoff_states: {}, using default backoff", e);
                (60, 0) // 60 seconds default
            }
        }
    }

    /// Increment error count for a resource
    pub fn increment_error(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            let state = states
                .entry(resource_key.to_string())
                .or_insert_with(BackoffState::new);
            state.increment_error();
        }
    }

    /// Reset error count for a resource (on successful reconciliation)
    pub fn reset_error(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            if let Some(state) = states.get_mut(resource_key) {
                state.reset();
            }
        }
    }
}
