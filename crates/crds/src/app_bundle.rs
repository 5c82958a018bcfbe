//! AppBundle CRD
//!
//! Declares a packaged application bundle (a chart archive addressed by URL)
//! that should be rendered and deployed into the cluster.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "bundleops.io",
    version = "v1alpha1",
    kind = "AppBundle",
    namespaced,
    status = "AppBundleStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct AppBundleSpec {
    /// Location of the packaged chart archive (HTTP/HTTPS URL)
    pub desired_bundle_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppBundleStatus {
    /// True once every manifest from the most recent render has been applied
    #[serde(default)]
    pub deployed: bool,
}
