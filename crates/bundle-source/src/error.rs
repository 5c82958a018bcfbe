//! Bundle source errors

use thiserror::Error;

/// Errors that can occur while fetching, rendering or parsing a chart bundle
#[derive(Debug, Error)]
pub enum BundleError {
    /// HTTP transport error while fetching the archive
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The chart source answered, but not with the archive
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Staging the archive for the render command failed
    #[error("failed to stage chart archive: {0}")]
    Stage(#[from] std::io::Error),

    /// The external render command could not be run or exited non-zero
    #[error("render failed: {0}")]
    Render(String),

    /// The rendered stream contained a document that is not valid YAML/JSON
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A rendered document parsed but is not a usable manifest object
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}
