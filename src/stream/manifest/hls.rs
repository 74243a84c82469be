//! HLS (M3U8) playlist expansion

use std::collections::HashMap;

use url::Url;

use crate::stream::format::FormatDescriptor;

/// Codec prefixes that indicate a video track in a `CODECS` attribute.
const VIDEO_CODEC_PREFIXES: &[&str] = &["avc", "hvc", "hev", "vp8", "vp9", "vp09", "av01", "mp4v"];

/// Options recorded on every descriptor produced from one playlist.
#[derive(Debug, Clone, Copy)]
pub struct HlsOptions<'a> {
    pub ext: &'a str,
    pub protocol: &'a str,
    pub preference: Option<i32>,
    pub m3u8_id: &'a str,
}

/// Expand an M3U8 document into format descriptors.
///
/// A media playlist (segments, no variants) is a single format pointing at
/// the playlist itself. A master playlist yields one format per
/// `#EXT-X-STREAM-INF` variant.
pub fn parse_m3u8(content: &str, manifest_url: &str, opts: HlsOptions<'_>) -> Vec<FormatDescriptor> {
    if !content.contains("#EXT-X-STREAM-INF:") {
        if content.contains("#EXTINF:") || content.contains("#EXT-X-TARGETDURATION") {
            return vec![descriptor(manifest_url.to_string(), opts.m3u8_id.to_string(), opts)];
        }
        return Vec::new();
    }

    let base = Url::parse(manifest_url).ok();
    let mut formats = Vec::new();
    let mut lines = content.lines().map(str::trim);

    while let Some(line) = lines.next() {
        let Some(rest) = line.strip_prefix("#EXT-X-STREAM-INF:") else {
            continue;
        };
        let attrs = parse_attributes(rest);

        // The variant URI is the next non-comment line.
        let Some(uri_line) = lines.by_ref().find(|l| !l.is_empty() && !l.starts_with('#')) else {
            break;
        };

        let bandwidth = attrs
            .get("AVERAGE-BANDWIDTH")
            .or_else(|| attrs.get("BANDWIDTH"))
            .and_then(|v| v.parse::<u64>().ok());
        let bitrate = bandwidth.map(|bps| bps / 1000).filter(|kbps| *kbps > 0);

        let suffix = bitrate.map_or_else(|| formats.len().to_string(), |b| b.to_string());
        let format_id = join_id(opts.m3u8_id, &suffix);

        let mut format = descriptor(resolve_url(base.as_ref(), uri_line), format_id, opts);
        format.bitrate = bitrate;
        if let Some(codecs) = attrs.get("CODECS") {
            if is_audio_only(codecs) {
                format.vcodec = Some("none".to_string());
            }
        }
        formats.push(format);
    }

    formats
}

fn descriptor(url: String, format_id: String, opts: HlsOptions<'_>) -> FormatDescriptor {
    FormatDescriptor {
        ext: Some(opts.ext.to_string()),
        protocol: Some(opts.protocol.to_string()),
        preference: opts.preference,
        ..FormatDescriptor::new(url, format_id)
    }
}

pub(crate) fn join_id(prefix: &str, suffix: &str) -> String {
    if prefix.is_empty() {
        suffix.to_string()
    } else {
        format!("{prefix}-{suffix}")
    }
}

fn is_audio_only(codecs: &str) -> bool {
    !codecs.split(',').map(str::trim).any(|codec| {
        VIDEO_CODEC_PREFIXES
            .iter()
            .any(|prefix| codec.starts_with(prefix))
    })
}

fn resolve_url(base: Option<&Url>, reference: &str) -> String {
    base.and_then(|b| b.join(reference).ok())
        .map_or_else(|| reference.to_string(), String::from)
}

fn parse_attributes(attr_str: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut chars = attr_str.chars().peekable();

    while chars.peek().is_some() {
        let key: String = chars.by_ref().take_while(|&c| c != '=').collect();

        if key.is_empty() {
            break;
        }

        // Quoted values may contain commas.
        let value = if chars.peek() == Some(&'"') {
            chars.next();
            let v: String = chars.by_ref().take_while(|&c| c != '"').collect();
            chars.next();
            v
        } else {
            chars.by_ref().take_while(|&c| c != ',').collect()
        };

        attrs.insert(key.trim().to_string(), value.trim().to_string());
    }

    attrs
}
