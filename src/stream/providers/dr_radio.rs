//! DR radio (Danish) on-demand provider
//!
//! Resolves `dr.dk/radio/ondemand/...` and `dr.dk/radio/serier/...` pages.
//! Metadata comes from the page's open-graph tags with the MU program card
//! as fallback; formats come from the links of the program card's audio
//! asset.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::http_client::HttpFetcher;
use crate::meta::{first_present, strip_prefix_owned, OpenGraph};
use crate::stream::format::{sort_formats, FormatDescriptor, MediaRecord};
use crate::stream::manifest::FetchingManifestExtractor;
use crate::stream::provider::{Fetcher, ManifestExtractor, StreamProvider};

const PROVIDER_NAME: &str = "drradio";

static PAGE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?dr\.dk/radio/(?:ondemand|serier)/(?:[^/]+/)*(?P<id>[\da-z-]+)(?:[/#?]|$)",
    )
    .expect("valid page URL pattern")
});

/// Boilerplate the site puts in front of every og:title.
const TITLE_PREFIX: &str = "DR Netradio: Hør ";
const AUDIO_ASSET_KIND: &str = "AudioResource";
const DOWNLOAD_TARGET: &str = "Download";
/// Host of the legacy progressive-download CDN; its files are a fallback.
const VOD_HOST: &str = "vodfiles.dr.dk";
const HDS_QUERY: &str = "hdcore=3.10.0&plugin=aasp-3.10.0.29.28";
const HLS_EXT: &str = "mp3";
const HLS_PROTOCOL: &str = "m3u8_native";

const MANIFEST_PREFERENCE: i32 = -2;
const VOD_PREFERENCE: i32 = -3;

const GEO_MESSAGE: &str = "Unfortunately, DR is not allowed to show this program outside Denmark.";
const GEO_COUNTRIES: &[&str] = &["DK"];

// ─── Program card ────────────────────────────────────────────────────────────

/// MU program card, as returned by `/mu/programcard/expanded/<id>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgramCard {
    pub data: Vec<ProgramData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgramData {
    pub title: Option<String>,
    pub description: Option<String>,
    /// ISO 8601.
    pub created_time: Option<String>,
    /// Audio assets only; other kinds are dropped unread.
    #[serde(deserialize_with = "audio_assets")]
    pub assets: Vec<Asset>,
}

/// One encoding profile of the program.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Asset {
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration_in_milliseconds: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub restricted_to_denmark: Option<bool>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// One delivery endpoint of an asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Link {
    pub uri: Option<String>,
    /// `"HDS"`, `"HLS"`, `"Download"`, `"Streaming"`, ...
    pub target: Option<String>,
    pub file_format: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub bitrate: Option<u64>,
}

impl ProgramCard {
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ResolveError::parse("program card", e))
    }

    /// The first `Data` entry; the rest are ignored.
    pub fn into_primary(self) -> Result<ProgramData> {
        self.data
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::parse("program card", "empty Data list"))
    }
}

/// Accepts numbers and numeric strings; anything else is `None`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|f| f.abs() > 0.0),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Decode only `AudioResource` entries of `Assets`.
fn audio_assets<'de, D>(deserializer: D) -> std::result::Result<Vec<Asset>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .filter(|v| v.get("Kind").and_then(Value::as_str) == Some(AUDIO_ASSET_KIND))
        .map(|v| serde_json::from_value(v).map_err(serde::de::Error::custom))
        .collect()
}

// ─── Metadata merging ────────────────────────────────────────────────────────

/// Record fields resolved from page tags and program card.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedMetadata {
    pub title: String,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Page tags win over the program card; the title is mandatory.
pub fn merge_metadata(og: &OpenGraph, data: &ProgramData) -> Result<MergedMetadata> {
    let title = first_present([
        og.title
            .clone()
            .map(|t| strip_prefix_owned(t, TITLE_PREFIX)),
        data.title.clone(),
    ])
    .ok_or(ResolveError::MissingField("title"))?;

    let description = first_present([og.description.clone(), data.description.clone()]);
    let timestamp = data.created_time.as_deref().and_then(parse_iso8601);

    Ok(MergedMetadata {
        title,
        description,
        timestamp,
    })
}

/// Best-effort ISO 8601 parsing. Values without an offset are taken as UTC.
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

// ─── Format enumeration ──────────────────────────────────────────────────────

/// Manifest family of a link, keyed by its `Target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// Adobe HDS (F4M).
    Hds,
    /// HLS (M3U8).
    Hls,
}

impl ManifestKind {
    /// `None` for targets that are fetched directly.
    pub fn from_target(target: &str) -> Option<Self> {
        match target {
            "HDS" => Some(Self::Hds),
            "HLS" => Some(Self::Hls),
            _ => None,
        }
    }
}

/// Duration and geo flag of the audio asset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioSummary {
    /// Seconds.
    pub duration: Option<f64>,
    pub restricted_to_denmark: bool,
}

/// What to do with one link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkPlan {
    Direct(FormatDescriptor),
    Manifest {
        kind: ManifestKind,
        url: String,
        manifest_id: String,
    },
}

/// Walk the audio assets and plan every link with a URI.
///
/// When several audio assets exist, the last one decides duration and the
/// geo flag (links from all of them are kept).
pub fn plan_links(assets: &[Asset]) -> (AudioSummary, Vec<LinkPlan>) {
    let mut summary = AudioSummary::default();
    let mut plans = Vec::new();

    for asset in assets
        .iter()
        .filter(|a| a.kind.as_deref() == Some(AUDIO_ASSET_KIND))
    {
        summary = AudioSummary {
            duration: asset.duration_in_milliseconds.map(|ms| ms / 1000.0),
            restricted_to_denmark: asset.restricted_to_denmark.unwrap_or(false),
        };
        plans.extend(asset.links.iter().filter_map(plan_link));
    }

    (summary, plans)
}

fn plan_link(link: &Link) -> Option<LinkPlan> {
    let uri = link.uri.as_deref().filter(|u| !u.is_empty())?;
    let target = link.target.as_deref().unwrap_or_default();

    let plan = match ManifestKind::from_target(target) {
        Some(kind @ ManifestKind::Hds) => LinkPlan::Manifest {
            kind,
            url: append_query(uri, HDS_QUERY),
            manifest_id: target.to_string(),
        },
        Some(kind @ ManifestKind::Hls) => LinkPlan::Manifest {
            kind,
            url: uri.to_string(),
            manifest_id: target.to_string(),
        },
        None => LinkPlan::Direct(direct_format(uri, target, link)),
    };
    Some(plan)
}

fn direct_format(uri: &str, target: &str, link: &Link) -> FormatDescriptor {
    let base_id = if target == DOWNLOAD_TARGET {
        link.file_format.clone().unwrap_or_default()
    } else {
        target.to_string()
    };
    let format_id = match link.bitrate.filter(|b| *b > 0) {
        Some(bitrate) => format!("{base_id}-{bitrate}"),
        None => base_id,
    };

    let parsed = Url::parse(uri).ok();
    let on_vod_host = parsed
        .as_ref()
        .and_then(Url::host_str)
        .map_or_else(|| uri.contains(VOD_HOST), |host| host == VOD_HOST);

    FormatDescriptor {
        url: uri.to_string(),
        format_id,
        bitrate: link.bitrate,
        ext: link.file_format.clone(),
        preference: on_vod_host.then_some(VOD_PREFERENCE),
        protocol: parsed.map(|u| u.scheme().to_string()),
        vcodec: Some("none".to_string()),
    }
}

fn append_query(uri: &str, query: &str) -> String {
    let sep = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{sep}{query}")
}

// ─── Restriction & assembly ──────────────────────────────────────────────────

/// Nothing playable from a Denmark-only asset means we are outside Denmark.
pub fn check_restriction(formats: &[FormatDescriptor], summary: &AudioSummary) -> Result<()> {
    if formats.is_empty() && summary.restricted_to_denmark {
        return Err(ResolveError::GeoRestricted {
            message: GEO_MESSAGE.to_string(),
            countries: GEO_COUNTRIES.iter().map(ToString::to_string).collect(),
        });
    }
    Ok(())
}

/// Combine merged metadata, the audio summary and the sorted formats.
pub fn assemble_record(
    id: String,
    webpage_url: &str,
    thumbnail: String,
    metadata: MergedMetadata,
    audio: AudioSummary,
    formats: Vec<FormatDescriptor>,
) -> MediaRecord {
    MediaRecord {
        id,
        title: metadata.title,
        description: metadata.description,
        thumbnail,
        upload_date: metadata.timestamp.map(|ts| ts.format("%Y%m%d").to_string()),
        timestamp: metadata.timestamp,
        duration: audio.duration,
        formats,
        extractor: PROVIDER_NAME.to_string(),
        webpage_url: webpage_url.to_string(),
    }
}

// ─── Provider ────────────────────────────────────────────────────────────────

pub struct DrRadioProvider {
    fetcher: Arc<dyn Fetcher>,
    manifests: Arc<dyn ManifestExtractor>,
    base_url: String,
    manifest_concurrency: usize,
}

impl DrRadioProvider {
    /// Provider backed by real HTTP fetches.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config)?);
        let manifests = Arc::new(FetchingManifestExtractor::new(Arc::clone(&fetcher)));
        Ok(Self::with_collaborators(config, fetcher, manifests))
    }

    /// Provider with injected collaborators.
    pub fn with_collaborators(
        config: &ResolverConfig,
        fetcher: Arc<dyn Fetcher>,
        manifests: Arc<dyn ManifestExtractor>,
    ) -> Self {
        Self {
            fetcher,
            manifests,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            manifest_concurrency: config.manifest_concurrency.max(1),
        }
    }

    /// Item id of a page URL: the last path segment.
    pub fn extract_id(url: &str) -> Result<String> {
        PAGE_URL_RE
            .captures(url)
            .and_then(|caps| caps.name("id"))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ResolveError::no_match(url))
    }

    pub fn program_card_url(&self, id: &str) -> String {
        format!("{}/mu/programcard/expanded/{id}", self.base_url)
    }

    pub fn thumbnail_url(&self, id: &str) -> String {
        format!(
            "{}/mu/programcard/imageuri/urn:dr:mu:programcard:{id}",
            self.base_url
        )
    }

    pub async fn fetch_program_card(&self, id: &str) -> Result<ProgramCard> {
        let value = self.fetcher.fetch_json(&self.program_card_url(id)).await?;
        ProgramCard::from_json(value)
    }

    /// Expand every plan, keeping plan order. A manifest that fails to load
    /// contributes nothing.
    async fn collect_formats(&self, id: &str, plans: Vec<LinkPlan>) -> Vec<FormatDescriptor> {
        stream::iter(plans)
            .map(move |plan| async move {
                match plan {
                    LinkPlan::Direct(format) => vec![format],
                    LinkPlan::Manifest {
                        kind,
                        url,
                        manifest_id,
                    } => self.expand_manifest(id, kind, &url, &manifest_id).await,
                }
            })
            .buffered(self.manifest_concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn expand_manifest(
        &self,
        id: &str,
        kind: ManifestKind,
        url: &str,
        manifest_id: &str,
    ) -> Vec<FormatDescriptor> {
        let result = match kind {
            ManifestKind::Hds => {
                self.manifests
                    .extract_f4m_formats(url, id, Some(MANIFEST_PREFERENCE), manifest_id)
                    .await
            }
            ManifestKind::Hls => {
                self.manifests
                    .extract_m3u8_formats(
                        url,
                        id,
                        HLS_EXT,
                        HLS_PROTOCOL,
                        Some(MANIFEST_PREFERENCE),
                        manifest_id,
                    )
                    .await
            }
        };

        result.unwrap_or_else(|e| {
            warn!("Skipping {kind:?} manifest {url}: {e}");
            Vec::new()
        })
    }
}

#[async_trait]
impl StreamProvider for DrRadioProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn matches(&self, url: &str) -> bool {
        PAGE_URL_RE.is_match(url)
    }

    #[instrument(skip(self))]
    async fn resolve(&self, url: &str) -> Result<MediaRecord> {
        let id = Self::extract_id(url)?;
        debug!("Program card: {}", self.program_card_url(&id));

        let (page, card) =
            tokio::try_join!(self.fetcher.fetch_page(url), self.fetch_program_card(&id))?;
        let data = card.into_primary()?;

        let metadata = merge_metadata(&OpenGraph::from_html(&page), &data)?;
        let (audio, plans) = plan_links(&data.assets);
        debug!("{} links planned", plans.len());

        let mut formats = self.collect_formats(&id, plans).await;
        sort_formats(&mut formats);
        check_restriction(&formats, &audio)?;

        if formats.is_empty() {
            warn!("No formats found for {id}");
        }
        info!("Resolved {id}: {} ({} formats)", metadata.title, formats.len());

        Ok(assemble_record(
            id.clone(),
            url,
            self.thumbnail_url(&id),
            metadata,
            audio,
            formats,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(target: Option<&str>, uri: &str, file_format: Option<&str>, bitrate: Option<u64>) -> Link {
        Link {
            uri: Some(uri.to_string()),
            target: target.map(ToString::to_string),
            file_format: file_format.map(ToString::to_string),
            bitrate,
        }
    }

    fn data(title: Option<&str>, description: Option<&str>) -> ProgramData {
        ProgramData {
            title: title.map(ToString::to_string),
            description: description.map(ToString::to_string),
            created_time: Some("2013-05-30T10:18:31+02:00".to_string()),
            assets: vec![],
        }
    }

    #[test]
    fn test_extract_id() {
        assert_eq!(
            DrRadioProvider::extract_id("http://www.dr.dk/radio/ondemand/p3/monte-carlo-265").unwrap(),
            "monte-carlo-265"
        );
        assert_eq!(
            DrRadioProvider::extract_id("http://www.dr.dk/radio/serier/filmland-2017-01-05").unwrap(),
            "filmland-2017-01-05"
        );
        assert_eq!(
            DrRadioProvider::extract_id("https://dr.dk/radio/ondemand/p1/a/b/item-1/?x=1").unwrap(),
            "item-1"
        );
        assert_eq!(
            DrRadioProvider::extract_id("https://www.dr.dk/radio/ondemand/p3/item-2#t=10").unwrap(),
            "item-2"
        );
    }

    #[test]
    fn test_extract_id_rejects_other_urls() {
        for url in [
            "https://www.dr.dk/drtv/episode/gintberg-til-gaes_363891",
            "https://www.dr.dk/radio/ondemand/",
            "https://www.dr.dk/radio/live/p3",
            "https://example.com/radio/ondemand/p3/x",
            "ftp://www.dr.dk/radio/ondemand/p3/x",
            "",
        ] {
            let err = DrRadioProvider::extract_id(url).unwrap_err();
            assert!(matches!(err, ResolveError::NoMatch { .. }), "{url}");
        }
    }

    #[test]
    fn title_prefix_stripped_and_page_wins() {
        let og = OpenGraph {
            title: Some("DR Netradio: Hør Foo".into()),
            description: None,
        };
        let merged = merge_metadata(&og, &data(Some("Bar"), Some("card desc"))).unwrap();
        assert_eq!(merged.title, "Foo");
        assert_eq!(merged.description.as_deref(), Some("card desc"));
    }

    #[test]
    fn title_falls_back_to_program_card() {
        let merged = merge_metadata(&OpenGraph::default(), &data(Some("Bar"), None)).unwrap();
        assert_eq!(merged.title, "Bar");
        assert_eq!(merged.description, None);
    }

    #[test]
    fn prefix_only_title_falls_back() {
        let og = OpenGraph {
            title: Some("DR Netradio: Hør ".into()),
            description: Some("page desc".into()),
        };
        let merged = merge_metadata(&og, &data(Some("Bar"), Some("card desc"))).unwrap();
        assert_eq!(merged.title, "Bar");
        assert_eq!(merged.description.as_deref(), Some("page desc"));
    }

    #[test]
    fn missing_title_is_error() {
        let err = merge_metadata(&OpenGraph::default(), &data(None, None)).unwrap_err();
        assert!(matches!(err, ResolveError::MissingField("title")));
    }

    #[test]
    fn test_parse_iso8601() {
        let ts = parse_iso8601("2013-05-30T10:18:31+02:00").unwrap();
        assert_eq!(ts.timestamp(), 1_369_901_911);
        assert_eq!(parse_iso8601("2017-01-02T13:24:27Z").unwrap().timestamp(), 1_483_363_467);
        assert_eq!(parse_iso8601("2017-01-02T13:24:27.500Z").unwrap().timestamp(), 1_483_363_467);
        assert_eq!(parse_iso8601("2017-01-02T13:24:27").unwrap().timestamp(), 1_483_363_467);
        assert_eq!(parse_iso8601("not a date"), None);
        assert_eq!(parse_iso8601(""), None);
    }

    #[test]
    fn download_target_uses_file_format_and_bitrate() {
        let l = link(Some("Download"), "http://http.drod.dr.dk/a.mp3", Some("mp3"), Some(192));
        let Some(LinkPlan::Direct(format)) = plan_link(&l) else {
            panic!("expected direct plan");
        };
        assert_eq!(format.format_id, "mp3-192");
        assert_eq!(format.url, "http://http.drod.dr.dk/a.mp3");
        assert_eq!(format.bitrate, Some(192));
        assert_eq!(format.ext.as_deref(), Some("mp3"));
        assert_eq!(format.preference, None);
        assert_eq!(format.protocol.as_deref(), Some("http"));
        assert!(format.is_audio_only());
    }

    #[test]
    fn other_targets_keep_target_as_id() {
        let l = link(Some("Streaming"), "rtmp://stream.dr.dk/a", Some("mp3"), None);
        let Some(LinkPlan::Direct(format)) = plan_link(&l) else {
            panic!("expected direct plan");
        };
        assert_eq!(format.format_id, "Streaming");

        let l = link(None, "http://x.dr.dk/b.mp3", None, Some(0));
        let Some(LinkPlan::Direct(format)) = plan_link(&l) else {
            panic!("expected direct plan");
        };
        assert_eq!(format.format_id, "");
        assert_eq!(format.bitrate, Some(0));
    }

    #[test]
    fn vod_host_is_deprioritized() {
        let l = link(Some("Download"), "http://vodfiles.dr.dk/a.mp3", Some("mp3"), Some(64));
        let Some(LinkPlan::Direct(format)) = plan_link(&l) else {
            panic!("expected direct plan");
        };
        assert_eq!(format.preference, Some(-3));
    }

    #[test]
    fn manifest_targets_are_delegated() {
        let hds = plan_link(&link(Some("HDS"), "http://drod.dr.dk/z/a/manifest.f4m", None, None));
        assert_eq!(
            hds,
            Some(LinkPlan::Manifest {
                kind: ManifestKind::Hds,
                url: "http://drod.dr.dk/z/a/manifest.f4m?hdcore=3.10.0&plugin=aasp-3.10.0.29.28"
                    .into(),
                manifest_id: "HDS".into(),
            })
        );

        let hls = plan_link(&link(Some("HLS"), "http://drod.dr.dk/i/a/master.m3u8?x=1", None, None));
        assert_eq!(
            hls,
            Some(LinkPlan::Manifest {
                kind: ManifestKind::Hls,
                url: "http://drod.dr.dk/i/a/master.m3u8?x=1".into(),
                manifest_id: "HLS".into(),
            })
        );
    }

    #[test]
    fn empty_uri_is_skipped() {
        assert_eq!(plan_link(&link(Some("Download"), "", Some("mp3"), None)), None);
        let mut l = link(Some("Download"), "x", None, None);
        l.uri = None;
        assert_eq!(plan_link(&l), None);
    }

    #[test]
    fn hds_query_joins_existing_query() {
        assert_eq!(append_query("http://x/m.f4m?a=1", "b=2"), "http://x/m.f4m?a=1&b=2");
    }

    #[test]
    fn audio_assets_drive_summary_last_wins() {
        let card = ProgramCard::from_json(json!({
            "Data": [{
                "Title": "T",
                "Assets": [
                    {"Kind": "ImageResource", "Links": [{"Uri": "http://img", "Target": "Download"}]},
                    {"Kind": "AudioResource", "DurationInMilliseconds": 1500, "RestrictedToDenmark": true,
                     "Links": [{"Uri": "http://a/1.mp3", "Target": "Download", "FileFormat": "mp3", "Bitrate": "128"}]},
                    {"Kind": "AudioResource", "DurationInMilliseconds": 3000,
                     "Links": [{"Uri": "http://a/2.mp3", "Target": "Download", "FileFormat": "mp3"}]}
                ]
            }]
        }))
        .unwrap();
        let data = card.into_primary().unwrap();
        let (summary, plans) = plan_links(&data.assets);

        assert_eq!(summary.duration, Some(3.0));
        assert!(!summary.restricted_to_denmark);
        assert_eq!(plans.len(), 2);
        let LinkPlan::Direct(first) = &plans[0] else {
            panic!("expected direct plan");
        };
        assert_eq!(first.format_id, "mp3-128");
    }

    #[test]
    fn loosely_typed_asset_fields_are_tolerated() {
        let card = ProgramCard::from_json(json!({
            "Data": [{
                "Title": "T",
                "Assets": [
                    {"Kind": "VideoResource", "DurationInMilliseconds": "1500", "RestrictedToDenmark": "yes",
                     "Links": "not a list"},
                    {"Kind": "AudioResource", "DurationInMilliseconds": "2500", "RestrictedToDenmark": 1,
                     "Links": [{"Uri": "http://a/1.mp3", "Target": "Download", "FileFormat": "mp3"}]},
                    null
                ]
            }]
        }))
        .unwrap();
        let data = card.into_primary().unwrap();
        assert_eq!(data.assets.len(), 1);

        let (summary, plans) = plan_links(&data.assets);
        assert_eq!(summary.duration, Some(2.5));
        assert!(summary.restricted_to_denmark);
        assert_eq!(plans.len(), 1);
    }

    #[test]
    fn unparseable_duration_is_unknown() {
        let card = ProgramCard::from_json(json!({
            "Data": [{"Assets": [{"Kind": "AudioResource", "DurationInMilliseconds": "n/a"}]}]
        }))
        .unwrap();
        let (summary, _) = plan_links(&card.into_primary().unwrap().assets);
        assert_eq!(summary.duration, None);
        assert!(!summary.restricted_to_denmark);
    }

    #[test]
    fn duration_converted_to_seconds() {
        let asset = Asset {
            kind: Some("AudioResource".into()),
            duration_in_milliseconds: Some(1500.0),
            restricted_to_denmark: None,
            links: vec![],
        };
        let (summary, plans) = plan_links(&[asset]);
        assert_eq!(summary.duration, Some(1.5));
        assert!(plans.is_empty());
    }

    #[test]
    fn restriction_only_when_empty_and_flagged() {
        let flagged = AudioSummary {
            duration: None,
            restricted_to_denmark: true,
        };
        let err = check_restriction(&[], &flagged).unwrap_err();
        assert!(err.is_expected());
        match err {
            ResolveError::GeoRestricted { countries, .. } => assert_eq!(countries, vec!["DK"]),
            other => panic!("unexpected {other:?}"),
        }

        assert!(check_restriction(&[], &AudioSummary::default()).is_ok());
        let one = [FormatDescriptor::new("http://a", "a")];
        assert!(check_restriction(&one, &flagged).is_ok());
    }

    #[test]
    fn malformed_program_cards_are_parse_errors() {
        let err = ProgramCard::from_json(json!({"Data": "nope"})).unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));

        let err = ProgramCard::from_json(json!({"Data": []}))
            .unwrap()
            .into_primary()
            .unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));

        let err = ProgramCard::from_json(json!({"Data": [{"Title": "T"}]})).unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
    }

    #[test]
    fn derived_urls_follow_base() {
        let config = ResolverConfig::default().with_base_url("http://127.0.0.1:1234/");
        let provider = DrRadioProvider::new(&config).unwrap();
        assert_eq!(
            provider.program_card_url("x-1"),
            "http://127.0.0.1:1234/mu/programcard/expanded/x-1"
        );
        assert_eq!(
            provider.thumbnail_url("x-1"),
            "http://127.0.0.1:1234/mu/programcard/imageuri/urn:dr:mu:programcard:x-1"
        );
    }

    #[test]
    fn test_matches() {
        let provider = DrRadioProvider::new(&ResolverConfig::default()).unwrap();
        assert!(provider.matches("http://www.dr.dk/radio/ondemand/p3/monte-carlo-265"));
        assert!(!provider.matches("https://www.dr.dk/drtv/episode/test_123"));
        assert!(!provider.matches("https://example.com"));
    }
}
