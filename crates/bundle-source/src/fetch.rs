//! Chart archive fetching
//!
//! Single GET-style retrieval of a packaged chart archive over HTTP/HTTPS.
//! No authentication headers, redirect handling is left to transport defaults.

use crate::error::BundleError;
use crate::source_trait::BundleFetcher;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// HTTP chart archive fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with a 30 second request timeout
    pub fn new() -> Result<Self, BundleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(BundleError::Http)?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl BundleFetcher for HttpFetcher {
    async fn fetch_chart(&self, url: &str) -> Result<Vec<u8>, BundleError> {
        debug!("Fetching chart archive from {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BundleError::Fetch(format!(
                "{} returned status {}",
                url, status
            )));
        }

        let body = response.bytes().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    /// Serves one canned HTTP response on a loopback socket and returns the URL.
    fn serve_once(response: &'static str) -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_chart_success() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello",
        );
        let fetcher = HttpFetcher::new().expect("fetcher");

        let bytes = fetcher.fetch_chart(&url).await.expect("fetch succeeds");
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_fetch_chart_non_success_status() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        );
        let fetcher = HttpFetcher::new().expect("fetcher");

        let err = fetcher.fetch_chart(&url).await.expect_err("404 must fail");
        assert!(matches!(err, BundleError::Fetch(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_chart_connection_refused() {
        // Bind then drop so the port is (almost certainly) closed.
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback");
            listener.local_addr().expect("local addr")
        };
        let fetcher = HttpFetcher::new().expect("fetcher");

        let err = fetcher
            .fetch_chart(&format!("http://{}", addr))
            .await
            .expect_err("refused connection must fail");
        assert!(matches!(err, BundleError::Http(_)), "got {:?}", err);
    }
}
