//! Chart Bundle Source
//!
//! Fetches packaged chart archives, renders them into manifest streams and
//! parses the result into ordered, untyped manifest objects.
//!
//! # Example
//!
//! ```no_run
//! use bundle_source::{BundleFetcher, ChartRenderer, HelmRenderer, HttpFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpFetcher::new()?;
//! let renderer = HelmRenderer::new("helm");
//!
//! // Fetch the archive, expand it, decode the manifest stream
//! let chart = fetcher.fetch_chart("https://charts.example.com/app-1.0.0.tgz").await?;
//! let rendered = renderer.render_chart(&chart).await?;
//! let manifests = bundle_source::parse_manifest_stream(&rendered)?;
//!
//! for manifest in &manifests {
//!     println!("would apply {}", manifest.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Fetching**: single blocking GET of a chart archive over HTTP/HTTPS
//! - **Rendering**: stages the archive in a scoped temp file and shells out to
//!   an external templating command, capturing its stdout
//! - **Parsing**: multi-document YAML/JSON streams into ordered manifests
//! - **test-util**: in-memory mock fetcher/renderer for unit tests

pub mod error;
pub mod fetch;
pub mod manifest;
pub mod render;
#[path = "trait.rs"]
pub mod source_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use error::BundleError;
pub use fetch::HttpFetcher;
pub use manifest::{Manifest, parse_manifest_stream};
pub use render::HelmRenderer;
pub use source_trait::{BundleFetcher, ChartRenderer};
#[cfg(feature = "test-util")]
pub use mock::{MockBundleFetcher, MockChartRenderer};
