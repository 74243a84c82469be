//! Media resolution for drradio
//!
//! Providers turn page URLs into [`MediaRecord`]s; adaptive manifests are
//! expanded by the [`manifest`] sub-extractors.

pub mod format;
pub mod manifest;
pub mod provider;
pub mod providers;

pub use format::{compare_formats, sort_formats, FormatDescriptor, MediaRecord};
pub use provider::{Fetcher, ManifestExtractor, ProviderRouter, StreamProvider};
