//! HTTP document fetcher
//!
//! Features:
//! - HTTP/2 with fallback to HTTP/1.1
//! - TLS 1.3 via rustls
//! - Brotli, Gzip, Deflate compression (auto-negotiated)
//! - Connection pooling with keep-alive

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::stream::provider::Fetcher;

/// reqwest-backed [`Fetcher`]. Non-2xx responses are fetch errors; no
/// retries are attempted.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ResolveError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get_text(&self, url: &str, accept: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header("Accept", accept)
            .send()
            .await
            .map_err(|e| ResolveError::fetch(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ResolveError::fetch(url, format!("HTTP {status}")));
        }

        let body = resp.text().await.map_err(|e| ResolveError::fetch(url, e))?;
        debug!("Fetched {} bytes ({status})", body.len());
        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.get_text(url, "text/html,application/xhtml+xml,*/*;q=0.8")
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let body = self.get_text(url, "application/json").await?;
        serde_json::from_str(&body).map_err(|e| ResolveError::parse(format!("JSON from {url}"), e))
    }
}
