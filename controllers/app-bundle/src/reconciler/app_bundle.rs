//! AppBundle reconciler

use super::Reconciler;
use crate::error::ControllerError;
use bundle_source::parse_manifest_stream;
use crds::AppBundle;
use tracing::{debug, error, info};

impl Reconciler {
    /// Runs one fetch -> render -> parse -> apply -> report cycle for `bundle`.
    ///
    /// Every failure is returned unmodified to the scheduler, which owns
    /// retry timing; the cycle itself never sleeps or retries. On any failure
    /// the AppBundle's `status.deployed` keeps its previous value.
    pub async fn reconcile_app_bundle(&self, bundle: &AppBundle) -> Result<(), ControllerError> {
        let name = bundle
            .metadata
            .name
            .as_ref()
            .ok_or_else(|| ControllerError::InvalidConfig("AppBundle missing name".to_string()))?;
        let namespace = bundle.metadata.namespace.as_deref().unwrap_or("default");
        let resource_key = format!("{}/{}", namespace, name);

        match self.run_cycle(namespace, name, &resource_key).await {
            Ok(()) => {
                self.reset_error(&resource_key);
                Ok(())
            }
            Err(e) => {
                self.increment_error(&resource_key);
                Err(e)
            }
        }
    }

    async fn run_cycle(
        &self,
        namespace: &str,
        name: &str,
        resource_key: &str,
    ) -> Result<(), ControllerError> {
        info!("Reconciling AppBundle {}", resource_key);

        // Re-read by key: the watch event may be stale and the resource can
        // be gone by the time this cycle runs. Deletion is benign here.
        let Some(bundle) = self.store.get_app_bundle(namespace, name).await? else {
            info!("AppBundle {} no longer exists, nothing to do", resource_key);
            return Ok(());
        };

        let chart_url = &bundle.spec.desired_bundle_ref;
        let chart = match self.fetcher.fetch_chart(chart_url).await {
            Ok(chart) => chart,
            Err(e) => {
                error!(
                    "Failed to fetch chart {} for AppBundle {}: {}",
                    chart_url, resource_key, e
                );
                return Err(e.into());
            }
        };

        let rendered = match self.renderer.render_chart(&chart).await {
            Ok(rendered) => rendered,
            Err(e) => {
                error!("Failed to render chart for AppBundle {}: {}", resource_key, e);
                return Err(e.into());
            }
        };

        let manifests = parse_manifest_stream(&rendered).map_err(|e| {
            error!(
                "Failed to parse rendered manifests for AppBundle {}: {}",
                resource_key, e
            );
            ControllerError::Bundle(e)
        })?;
        info!(
            "Rendered {} manifests for AppBundle {}",
            manifests.len(),
            resource_key
        );

        // Create in render order; the first hard failure aborts the rest of
        // the cycle. Objects created before the failure stay (no rollback).
        for manifest in &manifests {
            match self.store.create_manifest(namespace, manifest).await {
                Ok(()) => {
                    debug!("Applied {} for AppBundle {}", manifest.display(), resource_key);
                }
                Err(e) if e.is_already_exists() => {
                    debug!(
                        "{} already exists, counting as applied",
                        manifest.display()
                    );
                }
                Err(e) => {
                    error!(
                        "Failed to apply {} for AppBundle {}: {}",
                        manifest.display(),
                        resource_key,
                        e
                    );
                    return Err(e);
                }
            }
        }

        // Only write the status when it would change; a cycle that finds the
        // bundle already deployed leaves the subresource alone.
        let already_deployed = bundle.status.as_ref().is_some_and(|s| s.deployed);
        if already_deployed {
            debug!(
                "AppBundle {} already marked deployed, skipping status update",
                resource_key
            );
        } else {
            self.store
                .update_deployed(namespace, name, true)
                .await
                .map_err(|e| {
                    error!("Failed to update AppBundle {} status: {}", resource_key, e);
                    e
                })?;
            info!("AppBundle {} marked deployed", resource_key);
        }

        Ok(())
    }
}
