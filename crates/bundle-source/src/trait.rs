//! Bundle source traits for mocking
//!
//! These traits abstract chart acquisition and rendering so the controller
//! can be exercised in unit tests, and so alternate rendering strategies
//! (library-based templating) can be substituted without touching the
//! reconciler. All async methods must be `Send` to work with Tokio's
//! work-stealing runtime.

use crate::error::BundleError;

/// Retrieves a packaged chart archive's raw bytes.
#[async_trait::async_trait]
pub trait BundleFetcher: Send + Sync {
    /// Fetch the archive at `url` in a single retrieval. No internal retry;
    /// retries are the scheduler's responsibility.
    async fn fetch_chart(&self, url: &str) -> Result<Vec<u8>, BundleError>;
}

/// Expands a chart archive into a flat manifest text stream.
#[async_trait::async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Render the archive with no value overrides, returning the
    /// multi-document manifest stream.
    async fn render_chart(&self, chart: &[u8]) -> Result<String, BundleError>;
}
