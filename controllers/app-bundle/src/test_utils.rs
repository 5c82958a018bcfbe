//! Test utilities for unit testing the reconciler
//!
//! Fixture constructors for AppBundle CRDs and an in-memory `ClusterStore`
//! that records every interaction so scenarios can assert on apply order and
//! status transitions.

use crate::error::ControllerError;
use crate::store::ClusterStore;
use bundle_source::Manifest;
use crds::{AppBundle, AppBundleSpec, AppBundleStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::ErrorResponse;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Helper to create a test AppBundle CRD
pub fn create_test_app_bundle(name: &str, namespace: &str, bundle_ref: &str) -> AppBundle {
    AppBundle {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: AppBundleSpec {
            desired_bundle_ref: bundle_ref.to_string(),
        },
        status: None,
    }
}

fn api_error(reason: &str, code: u16, message: String) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: reason.to_string(),
        code,
    })
}

/// In-memory ClusterStore recording every interaction.
///
/// Clones share state, so tests can keep a handle for assertions after
/// handing the store to the reconciler.
#[derive(Clone, Default)]
pub struct MockClusterStore {
    state: Arc<Mutex<MockStoreState>>,
}

#[derive(Default)]
struct MockStoreState {
    /// namespace/name -> AppBundle
    bundles: HashMap<String, AppBundle>,
    /// kind/name keys that pre-exist in the cluster
    existing: HashSet<String>,
    /// kind/name keys whose create hard-fails
    fail_create: HashSet<String>,
    /// every create attempt, in order (kind/name)
    attempted: Vec<String>,
    /// successful creates, in order (kind/name)
    created: Vec<String>,
    /// status writes, in order (namespace/name, deployed)
    status_writes: Vec<(String, bool)>,
    fail_get: bool,
    fail_status_write: bool,
}

impl MockClusterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_bundle(&self, bundle: AppBundle) {
        let key = format!(
            "{}/{}",
            bundle.metadata.namespace.as_deref().unwrap_or("default"),
            bundle.metadata.name.as_deref().unwrap_or("<unknown>")
        );
        self.state
            .lock()
            .expect("mock store lock")
            .bundles
            .insert(key, bundle);
    }

    /// Mark a kind/name as pre-existing so its create conflicts
    pub fn mark_existing(&self, key: &str) {
        self.state
            .lock()
            .expect("mock store lock")
            .existing
            .insert(key.to_string());
    }

    /// Make the create of a kind/name hard-fail
    pub fn fail_create_of(&self, key: &str) {
        self.state
            .lock()
            .expect("mock store lock")
            .fail_create
            .insert(key.to_string());
    }

    pub fn fail_reads(&self) {
        self.state.lock().expect("mock store lock").fail_get = true;
    }

    pub fn fail_status_writes(&self) {
        self.state.lock().expect("mock store lock").fail_status_write = true;
    }

    /// Every create attempt in call order, including conflicts and failures
    pub fn attempted(&self) -> Vec<String> {
        self.state.lock().expect("mock store lock").attempted.clone()
    }

    /// Successful creates in call order
    pub fn created(&self) -> Vec<String> {
        self.state.lock().expect("mock store lock").created.clone()
    }

    /// Status subresource writes in call order
    pub fn status_writes(&self) -> Vec<(String, bool)> {
        self.state
            .lock()
            .expect("mock store lock")
            .status_writes
            .clone()
    }

    /// The stored bundle's observed `deployed` flag, if the bundle exists
    pub fn deployed(&self, namespace: &str, name: &str) -> Option<bool> {
        let key = format!("{}/{}", namespace, name);
        self.state
            .lock()
            .expect("mock store lock")
            .bundles
            .get(&key)
            .map(|bundle| bundle.status.as_ref().is_some_and(|s| s.deployed))
    }
}

#[async_trait::async_trait]
impl ClusterStore for MockClusterStore {
    async fn get_app_bundle(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<AppBundle>, ControllerError> {
        let state = self.state.lock().expect("mock store lock");
        if state.fail_get {
            return Err(ControllerError::Kube(api_error(
                "InternalError",
                500,
                "read rejected".to_string(),
            )));
        }
        Ok(state.bundles.get(&format!("{}/{}", namespace, name)).cloned())
    }

    async fn create_manifest(
        &self,
        _namespace: &str,
        manifest: &Manifest,
    ) -> Result<(), ControllerError> {
        let key = manifest.display();
        let mut state = self.state.lock().expect("mock store lock");
        state.attempted.push(key.clone());

        if state.fail_create.contains(&key) {
            return Err(ControllerError::Apply {
                manifest: key.clone(),
                source: api_error("Forbidden", 403, format!("{} create rejected", key)),
            });
        }
        if state.existing.contains(&key) || state.created.contains(&key) {
            return Err(ControllerError::Apply {
                manifest: key.clone(),
                source: api_error("AlreadyExists", 409, format!("{} already exists", key)),
            });
        }

        state.created.push(key);
        Ok(())
    }

    async fn update_deployed(
        &self,
        namespace: &str,
        name: &str,
        deployed: bool,
    ) -> Result<(), ControllerError> {
        let key = format!("{}/{}", namespace, name);
        let mut state = self.state.lock().expect("mock store lock");

        if state.fail_status_write {
            return Err(ControllerError::StatusWrite {
                resource: key,
                source: api_error("InternalError", 500, "status write rejected".to_string()),
            });
        }

        state.status_writes.push((key.clone(), deployed));
        if let Some(bundle) = state.bundles.get_mut(&key) {
            bundle.status = Some(AppBundleStatus { deployed });
        }
        Ok(())
    }
}
