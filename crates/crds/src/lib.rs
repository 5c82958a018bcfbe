//! Bundleops CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for Bundleops controllers.

pub mod app_bundle;

pub use app_bundle::*;
