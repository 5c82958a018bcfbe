//! Chart rendering via an external templating command
//!
//! The fetched archive is staged in a named temp file whose lifetime is
//! exactly one render call (the drop guard removes it on every exit path,
//! including cancellation), then `<command> template <path>` is run with no
//! value overrides and its stdout captured as the manifest stream.

use crate::error::BundleError;
use crate::source_trait::ChartRenderer;
use std::io::Write;
use tokio::process::Command;
use tracing::debug;

/// Renders chart archives by invoking an external `helm template`-style command
pub struct HelmRenderer {
    command: String,
}

impl HelmRenderer {
    /// Create a renderer that invokes `command template <archive>`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait::async_trait]
impl ChartRenderer for HelmRenderer {
    async fn render_chart(&self, chart: &[u8]) -> Result<String, BundleError> {
        let mut archive = tempfile::Builder::new()
            .prefix("chart-")
            .suffix(".tgz")
            .tempfile()?;
        archive.write_all(chart)?;
        archive.flush()?;

        debug!(
            "Rendering chart archive ({} bytes) with {}",
            chart.len(),
            self.command
        );

        let output = Command::new(&self.command)
            .arg("template")
            .arg(archive.path())
            .output()
            .await
            .map_err(|e| {
                BundleError::Render(format!("failed to invoke {}: {}", self.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BundleError::Render(format!(
                "{} template exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_chart_captures_stdout() {
        // `echo template <path>` stands in for a real templating command.
        let renderer = HelmRenderer::new("echo");

        let rendered = renderer.render_chart(b"archive").await.expect("render");
        assert!(rendered.starts_with("template "));
        assert!(rendered.contains(".tgz"));
    }

    #[tokio::test]
    async fn test_render_chart_empty_output() {
        let renderer = HelmRenderer::new("true");

        let rendered = renderer.render_chart(b"archive").await.expect("render");
        assert!(rendered.is_empty());
    }

    #[tokio::test]
    async fn test_render_chart_non_zero_exit() {
        let renderer = HelmRenderer::new("false");

        let err = renderer
            .render_chart(b"archive")
            .await
            .expect_err("non-zero exit must fail");
        assert!(matches!(err, BundleError::Render(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_render_chart_missing_command() {
        let renderer = HelmRenderer::new("/nonexistent/render-command");

        let err = renderer
            .render_chart(b"archive")
            .await
            .expect_err("missing command must fail");
        match err {
            BundleError::Render(msg) => assert!(msg.contains("failed to invoke")),
            other => panic!("expected Render error, got {:?}", other),
        }
    }
}
