//! Adaptive manifest sub-extractors (HDS and HLS).

pub mod hds;
pub mod hls;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::format::FormatDescriptor;
use super::provider::{Fetcher, ManifestExtractor};
use crate::error::Result;

pub use hds::parse_f4m;
pub use hls::{parse_m3u8, HlsOptions};

/// [`ManifestExtractor`] that downloads manifests through a [`Fetcher`]
/// and parses them locally.
pub struct FetchingManifestExtractor {
    fetcher: Arc<dyn Fetcher>,
}

impl FetchingManifestExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ManifestExtractor for FetchingManifestExtractor {
    #[instrument(skip(self, preference), fields(id = %video_id))]
    async fn extract_f4m_formats(
        &self,
        manifest_url: &str,
        video_id: &str,
        preference: Option<i32>,
        f4m_id: &str,
    ) -> Result<Vec<FormatDescriptor>> {
        let content = self.fetcher.fetch_page(manifest_url).await?;
        let formats = parse_f4m(&content, manifest_url, preference, f4m_id)?;
        debug!("F4M manifest yielded {} formats", formats.len());
        Ok(formats)
    }

    #[instrument(skip(self, ext, protocol, preference), fields(id = %video_id))]
    async fn extract_m3u8_formats(
        &self,
        manifest_url: &str,
        video_id: &str,
        ext: &str,
        protocol: &str,
        preference: Option<i32>,
        m3u8_id: &str,
    ) -> Result<Vec<FormatDescriptor>> {
        let content = self.fetcher.fetch_page(manifest_url).await?;
        let formats = parse_m3u8(
            &content,
            manifest_url,
            HlsOptions {
                ext,
                protocol,
                preference,
                m3u8_id,
            },
        );
        debug!("M3U8 manifest yielded {} formats", formats.len());
        Ok(formats)
    }
}
