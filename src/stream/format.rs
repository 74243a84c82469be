//! Normalized media record and format descriptors, plus the ordering
//! applied to resolved formats.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One playable or downloadable variant of a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    pub url: String,
    /// Derived identifier; not guaranteed unique across a record.
    pub format_id: String,
    /// Total bitrate in kbit/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
    /// Container / file extension (e.g. `"mp3"`, `"flv"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    /// Primary sort key. Negative values mark deprioritized variants;
    /// `None` is neutral.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<i32>,
    /// Delivery protocol (`"https"`, `"f4m"`, `"m3u8_native"`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Video codec; `"none"` marks an audio-only stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
}

impl FormatDescriptor {
    /// Minimal descriptor with only url and id set.
    pub fn new(url: impl Into<String>, format_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format_id: format_id.into(),
            bitrate: None,
            ext: None,
            preference: None,
            protocol: None,
            vcodec: None,
        }
    }

    /// Returns `true` if the descriptor carries no video track.
    pub fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
    }
}

/// Fully resolved media item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaRecord {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub thumbnail: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
    /// `YYYYMMDD` of `timestamp` in UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Ordered best-first by [`sort_formats`].
    pub formats: Vec<FormatDescriptor>,
    /// Name of the provider that produced the record.
    pub extractor: String,
    pub webpage_url: String,
}

/// Compare two formats: preference ascending (unset ranks between negative
/// and positive values), then bitrate descending (absent lowest), then
/// format id ascending.
pub fn compare_formats(a: &FormatDescriptor, b: &FormatDescriptor) -> Ordering {
    a.preference
        .unwrap_or(0)
        .cmp(&b.preference.unwrap_or(0))
        .then_with(|| b.bitrate.cmp(&a.bitrate))
        .then_with(|| a.format_id.cmp(&b.format_id))
}

/// Stable in-place sort with [`compare_formats`].
pub fn sort_formats(formats: &mut [FormatDescriptor]) {
    formats.sort_by(compare_formats);
}
