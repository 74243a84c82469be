//! HDS (Adobe F4M) manifest expansion

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use url::Url;

use super::hls::join_id;
use crate::error::{ResolveError, Result};
use crate::stream::format::FormatDescriptor;

/// Parse an F4M manifest into one descriptor per `<media>` rendition.
///
/// Renditions carrying a DRM header are skipped. Plain renditions point
/// back at the manifest URL (the downloader re-reads it); F4M 2.0 `href`
/// renditions point at their own nested manifest.
pub fn parse_f4m(
    content: &str,
    manifest_url: &str,
    preference: Option<i32>,
    f4m_id: &str,
) -> Result<Vec<FormatDescriptor>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let base = Url::parse(manifest_url).ok();
    let mut formats = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) if e.local_name().as_ref() == b"media" => {
                let media = MediaAttrs::from_element(e);
                if media.drm_header.is_some() {
                    continue;
                }

                // Renditions without a bitrate are numbered among the kept ones.
                let suffix = media
                    .bitrate
                    .map_or_else(|| formats.len().to_string(), |b| b.to_string());
                let url = media
                    .href
                    .as_deref()
                    .and_then(|href| base.as_ref().and_then(|b| b.join(href).ok()))
                    .map_or_else(|| manifest_url.to_string(), String::from);

                formats.push(FormatDescriptor {
                    bitrate: media.bitrate,
                    ext: Some("flv".to_string()),
                    preference,
                    protocol: Some("f4m".to_string()),
                    ..FormatDescriptor::new(url, join_id(f4m_id, &suffix))
                });
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ResolveError::parse(
                    "F4M manifest",
                    format!("at position {}: {e}", reader.buffer_position()),
                ))
            }
        }
    }

    Ok(formats)
}

#[derive(Debug, Default)]
struct MediaAttrs {
    bitrate: Option<u64>,
    href: Option<String>,
    drm_header: Option<String>,
}

impl MediaAttrs {
    fn from_element(e: &BytesStart<'_>) -> Self {
        let mut attrs = Self::default();
        for attr in e.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            match attr.key.local_name().as_ref() {
                b"bitrate" => attrs.bitrate = value.trim().parse().ok(),
                b"href" => attrs.href = Some(value.into_owned()),
                b"drmAdditionalHeaderId" => attrs.drm_header = Some(value.into_owned()),
                _ => {}
            }
        }
        attrs
    }
}
