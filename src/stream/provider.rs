//! Provider trait and the collaborators providers are built from.
//!
//! A [`StreamProvider`] turns a page URL of one streaming service into a
//! [`MediaRecord`]. Network access is injected through [`Fetcher`] and
//! [`ManifestExtractor`], so providers can be driven by fixed documents in
//! tests.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::format::{FormatDescriptor, MediaRecord};
use crate::error::{ResolveError, Result};

/// Raw document retrieval.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body as text.
    async fn fetch_page(&self, url: &str) -> Result<String>;

    /// GET `url` and parse the body as JSON.
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// Expands adaptive manifests into format descriptors.
#[async_trait]
pub trait ManifestExtractor: Send + Sync {
    /// HDS (Adobe F4M) manifest. Every produced descriptor carries
    /// `preference` and an id prefixed by `f4m_id`.
    async fn extract_f4m_formats(
        &self,
        manifest_url: &str,
        video_id: &str,
        preference: Option<i32>,
        f4m_id: &str,
    ) -> Result<Vec<FormatDescriptor>>;

    /// HLS (M3U8) manifest. `ext` is the container of the media segments
    /// and `protocol` the entry protocol recorded on each descriptor.
    async fn extract_m3u8_formats(
        &self,
        manifest_url: &str,
        video_id: &str,
        ext: &str,
        protocol: &str,
        preference: Option<i32>,
        m3u8_id: &str,
    ) -> Result<Vec<FormatDescriptor>>;
}

/// Trait for streaming service providers.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Short lowercase provider name (e.g. `"drradio"`).
    fn name(&self) -> &'static str;

    /// Returns `true` if this provider can handle the given URL.
    fn matches(&self, url: &str) -> bool;

    /// Resolve a page URL into a media record.
    async fn resolve(&self, url: &str) -> Result<MediaRecord>;
}

/// Dispatches URLs to the first provider that accepts them.
#[derive(Default)]
pub struct ProviderRouter {
    providers: Vec<Box<dyn StreamProvider>>,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_provider(mut self, provider: Box<dyn StreamProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_for(&self, url: &str) -> Option<&dyn StreamProvider> {
        self.providers
            .iter()
            .find(|p| p.matches(url))
            .map(|p| &**p)
    }

    /// Resolve `url` with the first matching provider, or fail with
    /// [`ResolveError::NoMatch`].
    pub async fn resolve(&self, url: &str) -> Result<MediaRecord> {
        let provider = self
            .provider_for(url)
            .ok_or_else(|| ResolveError::no_match(url))?;
        debug!(provider = provider.name(), "Dispatching {url}");
        provider.resolve(url).await
    }
}
