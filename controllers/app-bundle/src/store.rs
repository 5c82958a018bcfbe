//! Cluster object store access.
//!
//! The reconciler consumes exactly three store operations: read one AppBundle
//! by key, create one rendered manifest, and patch the AppBundle status. They
//! are abstracted behind the `ClusterStore` trait so the controller never
//! assumes a specific storage technology and so unit tests can run against an
//! in-memory store.

use crate::error::ControllerError;
use bundle_source::Manifest;
use crds::AppBundle;
use kube::Client;
use kube::api::{Api, DynamicObject, Patch, PatchParams, PostParams};
use kube::core::GroupVersionKind;
use kube::discovery::{self, Scope};
use tracing::debug;

/// Cluster store operations consumed by the reconciler.
#[async_trait::async_trait]
pub trait ClusterStore: Send + Sync {
    /// Read one AppBundle by key. `Ok(None)` when it no longer exists;
    /// deletion is not an error condition for this controller.
    async fn get_app_bundle(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<AppBundle>, ControllerError>;

    /// Create one rendered manifest in the cluster. An object that already
    /// exists surfaces as an error detectable via
    /// [`ControllerError::is_already_exists`].
    async fn create_manifest(
        &self,
        namespace: &str,
        manifest: &Manifest,
    ) -> Result<(), ControllerError>;

    /// Patch the AppBundle status subresource.
    async fn update_deployed(
        &self,
        namespace: &str,
        name: &str,
        deployed: bool,
    ) -> Result<(), ControllerError>;
}

/// Merge patch for the status subresource.
pub(crate) fn deployed_status_patch(deployed: bool) -> serde_json::Value {
    serde_json::json!({
        "status": {
            "deployed": deployed,
        }
    })
}

/// Kubernetes API server backed store.
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    /// Creates a store over an established client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn gvk_of(manifest: &Manifest) -> Result<GroupVersionKind, ControllerError> {
        let api_version = manifest.api_version().ok_or_else(|| {
            ControllerError::InvalidManifest(format!("{} has no apiVersion", manifest.display()))
        })?;
        let kind = manifest.kind().ok_or_else(|| {
            ControllerError::InvalidManifest(format!("{} has no kind", manifest.display()))
        })?;

        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };
        Ok(GroupVersionKind::gvk(group, version, kind))
    }
}

#[async_trait::async_trait]
impl ClusterStore for KubeStore {
    async fn get_app_bundle(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<AppBundle>, ControllerError> {
        let api: Api<AppBundle> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn create_manifest(
        &self,
        namespace: &str,
        manifest: &Manifest,
    ) -> Result<(), ControllerError> {
        let gvk = Self::gvk_of(manifest)?;

        // Resolve the manifest's kind against API discovery so charts can
        // carry arbitrary (including custom) resource types.
        let (resource, capabilities) = discovery::pinned_kind(&self.client, &gvk)
            .await
            .map_err(|e| ControllerError::Apply {
                manifest: manifest.display(),
                source: e,
            })?;

        let api: Api<DynamicObject> = if matches!(capabilities.scope, Scope::Namespaced) {
            // A namespaced object without its own namespace lands next to the
            // AppBundle that owns this cycle.
            let ns = manifest.namespace().unwrap_or(namespace);
            Api::namespaced_with(self.client.clone(), ns, &resource)
        } else {
            Api::all_with(self.client.clone(), &resource)
        };

        let object: DynamicObject = serde_json::from_value(manifest.0.clone())
            .map_err(|e| {
                ControllerError::InvalidManifest(format!("{}: {}", manifest.display(), e))
            })?;

        api.create(&PostParams::default(), &object)
            .await
            .map_err(|e| ControllerError::Apply {
                manifest: manifest.display(),
                source: e,
            })?;

        debug!("Created {} in the cluster", manifest.display());
        Ok(())
    }

    async fn update_deployed(
        &self,
        namespace: &str,
        name: &str,
        deployed: bool,
    ) -> Result<(), ControllerError> {
        let api: Api<AppBundle> = Api::namespaced(self.client.clone(), namespace);
        let status_patch = deployed_status_patch(deployed);

        let pp = PatchParams::default();
        api.patch_status(name, &pp, &Patch::Merge(&status_patch))
            .await
            .map_err(|e| ControllerError::StatusWrite {
                resource: format!("{}/{}", namespace, name),
                source: e,
            })?;

        Ok(())
    }
}
