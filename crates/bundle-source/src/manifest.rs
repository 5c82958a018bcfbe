//! Rendered manifest stream parsing
//!
//! A rendered chart is a text stream of zero or more structured documents
//! separated by YAML document markers; individual documents may be
//! YAML-flavored or JSON-flavored. Parsing is a single eager pass that
//! preserves document order. Empty documents (e.g. the comment-only blocks
//! `helm template` emits for source annotations) are skipped.

use crate::error::BundleError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One rendered, deployable object.
///
/// Untyped by design: manifest shape is not validated here, only carried.
/// Identity is the document's position in the render output plus its own
/// embedded type/name fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(pub Value);

impl Manifest {
    /// The embedded `apiVersion` field, if present
    pub fn api_version(&self) -> Option<&str> {
        self.0.get("apiVersion").and_then(Value::as_str)
    }

    /// The embedded `kind` field, if present
    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    /// The embedded `metadata.name` field, if present
    pub fn name(&self) -> Option<&str> {
        self.0.pointer("/metadata/name").and_then(Value::as_str)
    }

    /// The embedded `metadata.namespace` field, if present
    pub fn namespace(&self) -> Option<&str> {
        self.0.pointer("/metadata/namespace").and_then(Value::as_str)
    }

    /// `kind/name` label for logs
    pub fn display(&self) -> String {
        format!(
            "{}/{}",
            self.kind().unwrap_or("<unknown>"),
            self.name().unwrap_or("<unknown>")
        )
    }
}

/// Decodes a rendered manifest stream into an ordered manifest sequence.
///
/// Zero documents is a valid, non-error outcome. Any malformed document
/// fails the whole call; nothing parsed so far is returned.
pub fn parse_manifest_stream(text: &str) -> Result<Vec<Manifest>, BundleError> {
    let mut manifests = Vec::new();

    for document in serde_yaml::Deserializer::from_str(text) {
        let value = serde_yaml::Value::deserialize(document)?;
        if matches!(value, serde_yaml::Value::Null) {
            continue;
        }

        let json = serde_json::to_value(&value).map_err(|e| {
            BundleError::InvalidManifest(format!("document is not JSON-representable: {}", e))
        })?;
        if !json.is_object() {
            return Err(BundleError::InvalidManifest(
                "rendered document is not a mapping".to_string(),
            ));
        }

        manifests.push(Manifest(json));
    }

    Ok(manifests)
}
