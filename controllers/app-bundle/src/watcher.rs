//! Kubernetes resource watchers.
//!
//! This module handles watching Kubernetes resources for changes and
//! triggering reconciliation using kube_runtime::Controller.
//!
//! The watcher is the scheduler side of the contract: it delivers change
//! notifications at least once, serializes cycles per object key, and owns
//! retry timing through the error policy. The reconciler never sleeps or
//! retries on its own.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::AppBundle;
use futures::StreamExt;
use kube::{Api, ResourceExt};
use kube_runtime::{
    Controller, watcher,
    controller::{Action, Config as ControllerConfig},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Generic watcher helper that uses kube_runtime::Controller.
///
/// - Controller handles automatic reconnection of the underlying watch
/// - at most one cycle runs per object key, distinct keys run concurrently
/// - requeue timing on errors comes from the reconciler's per-resource backoff
async fn watch_resource<K, F>(
    api: Api<K>,
    reconciler: Arc<Reconciler>,
    reconcile_fn: F,
    resource_name: &str,
) -> Result<(), ControllerError>
where
    K: kube::Resource + Clone + Send + Sync + 'static + std::fmt::Debug + serde::de::DeserializeOwned,
    K::DynamicType: Default + std::cmp::Eq + std::hash::Hash + Clone + std::fmt::Debug + Unpin,
    F: Fn(Arc<Reconciler>, Arc<K>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Action, ControllerError>> + Send>>
        + Send
        + Sync
        + Clone
        + 'static,
{
    info!("Starting {} watcher", resource_name);

    // Error policy: requeue with per-resource Fibonacci backoff. The error
    // itself was already surfaced by the reconcile wrapper below.
    let policy_name = resource_name.to_string();
    let error_policy = move |obj: Arc<K>, err: &ControllerError, ctx: Arc<Reconciler>| {
        let key = format!(
            "{}/{}",
            obj.namespace().unwrap_or_else(|| "default".to_string()),
            obj.name_any()
        );
        let (backoff_seconds, error_count) = ctx.get_backoff_for_resource(&key);
        error!(
            "Reconciliation error for {} {} (error #{}): {}, requeueing in {}s",
            policy_name, key, error_count, err, backoff_seconds
        );
        Action::requeue(Duration::from_secs(backoff_seconds))
    };

    let reconcile_name = resource_name.to_string();
    let reconcile = move |obj: Arc<K>, ctx: Arc<Reconciler>| {
        let reconcile_fn = reconcile_fn.clone();
        let resource_name = reconcile_name.clone();
        async move {
            debug!("Reconciling {} {}", resource_name, obj.name_any());

            match reconcile_fn(ctx, obj).await {
                Ok(action) => Ok(action),
                Err(e) => {
                    error!("Reconciliation failed for {}: {}", resource_name, e);
                    Err(e)
                }
            }
        }
    };

    // Debounce batches bursts of watch events; concurrency bounds the number
    // of in-flight cycles across distinct keys.
    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(3);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .run(reconcile, error_policy, reconciler)
        .for_each(|res| async move {
            if let Err(e) = res {
                error!("Controller error: {}", e);
            }
        })
        .await;

    Ok(())
}

/// Watches AppBundle resources for changes.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    app_bundle_api: Api<AppBundle>,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(reconciler: Arc<Reconciler>, app_bundle_api: Api<AppBundle>) -> Self {
        Self {
            reconciler,
            app_bundle_api,
        }
    }

    /// Starts watching AppBundle resources.
    pub async fn watch_app_bundles(&self) -> Result<(), ControllerError> {
        watch_resource(
            self.app_bundle_api.clone(),
            self.reconciler.clone(),
            |reconciler, bundle: Arc<AppBundle>| {
                Box::pin(async move {
                    reconciler.reconcile_app_bundle(&bundle).await?;
                    // No requeue hint on success: wait for the next change
                    // notification.
                    Ok(Action::await_change())
                })
            },
            "AppBundle",
        )
        .await
    }
}
