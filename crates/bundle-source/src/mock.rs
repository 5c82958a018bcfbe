//! Mock bundle fetcher and renderer for unit testing
//!
//! In-memory implementations of [`BundleFetcher`] and [`ChartRenderer`] that
//! can be configured per test scenario without touching the network or
//! spawning a render subprocess.

use crate::error::BundleError;
use crate::source_trait::{BundleFetcher, ChartRenderer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock fetcher serving charts registered ahead of time
#[derive(Clone, Default)]
pub struct MockBundleFetcher {
    charts: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockBundleFetcher {
    /// Create an empty mock fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the archive bytes served for `url`
    pub fn add_chart(&self, url: impl Into<String>, chart: impl Into<Vec<u8>>) {
        self.charts
            .lock()
            .expect("mock fetcher lock")
            .insert(url.into(), chart.into());
    }
}

#[async_trait::async_trait]
impl BundleFetcher for MockBundleFetcher {
    async fn fetch_chart(&self, url: &str) -> Result<Vec<u8>, BundleError> {
        self.charts
            .lock()
            .expect("mock fetcher lock")
            .get(url)
            .cloned()
            .ok_or_else(|| BundleError::Fetch(format!("no chart registered for {}", url)))
    }
}

/// Mock renderer returning a canned manifest stream (or failure)
#[derive(Clone)]
pub struct MockChartRenderer {
    output: Arc<Result<String, String>>,
    rendered: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockChartRenderer {
    /// A renderer that always succeeds with `output`
    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            output: Arc::new(Ok(output.into())),
            rendered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A renderer that always fails with a render error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            output: Arc::new(Err(message.into())),
            rendered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Archives passed to `render_chart`, in call order
    pub fn rendered_charts(&self) -> Vec<Vec<u8>> {
        self.rendered.lock().expect("mock renderer lock").clone()
    }
}

#[async_trait::async_trait]
impl ChartRenderer for MockChartRenderer {
    async fn render_chart(&self, chart: &[u8]) -> Result<String, BundleError> {
        self.rendered
            .lock()
            .expect("mock renderer lock")
            .push(chart.to_vec());
        match self.output.as_ref() {
            Ok(output) => Ok(output.clone()),
            Err(message) => Err(BundleError::Render(message.clone())),
        }
    }
}
