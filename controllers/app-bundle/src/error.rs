//! Controller-specific error types.
//!
//! This module defines error types specific to the AppBundle Controller
//! that are not covered by upstream library errors.

use bundle_source::BundleError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the AppBundle Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Chart fetch/render/parse error
    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Creating a rendered manifest in the cluster failed
    #[error("failed to apply {manifest}: {source}")]
    Apply {
        /// kind/name of the manifest that failed
        manifest: String,
        #[source]
        source: KubeError,
    },

    /// Writing the AppBundle status subresource failed
    #[error("failed to update status for {resource}: {source}")]
    StatusWrite {
        /// namespace/name of the AppBundle
        resource: String,
        #[source]
        source: KubeError,
    },

    /// A rendered manifest cannot be addressed in the cluster
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// True when an apply failed only because the object already exists.
    ///
    /// Re-running a cycle must not fail merely because a prior cycle already
    /// created the object, so the reconciler suppresses this case.
    pub fn is_already_exists(&self) -> bool {
        match self {
            ControllerError::Apply {
                source: KubeError::Api(response),
                ..
            } => response.reason == "AlreadyExists" || response.code == 409,
            _ => false,
        }
    }
}
