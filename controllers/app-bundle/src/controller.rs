//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, reconciler and watcher together for the AppBundle Controller and
//! supervises the watcher task.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::store::KubeStore;
use crate::watcher::Watcher;
use bundle_source::{HelmRenderer, HttpFetcher};
use crds::AppBundle;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for AppBundle management.
pub struct Controller {
    app_bundle_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(
        render_command: String,
        namespace: Option<String>,
    ) -> Result<Self, ControllerError> {
        info!("Initializing AppBundle Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        let ns = namespace.as_deref().unwrap_or("default");
        let app_bundle_api: Api<AppBundle> = Api::namespaced(kube_client.clone(), ns);

        // Assemble the cycle's capabilities: HTTP chart source, external
        // templating command, Kubernetes-backed object store.
        let fetcher = HttpFetcher::new()?;
        let renderer = HelmRenderer::new(render_command);
        let store = KubeStore::new(kube_client);

        let reconciler = Arc::new(Reconciler::new(fetcher, renderer, store));
        let watcher_instance = Arc::new(Watcher::new(reconciler, app_bundle_api));

        // Start the watcher in a background task
        let app_bundle_watcher = {
            let watcher = watcher_instance;
            tokio::spawn(async move { watcher.watch_app_bundles().await })
        };

        Ok(Self { app_bundle_watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("AppBundle Controller running");

        // The watcher should run forever; returning is a failure.
        self.app_bundle_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("AppBundle watcher panicked: {}", e)))?
            .map_err(|e| ControllerError::Watch(format!("AppBundle watcher error: {}", e)))?;

        Ok(())
    }
}
