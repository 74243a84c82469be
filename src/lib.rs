//! `drradio` - DR radio on-demand resolver
//!
//! Turns a `dr.dk/radio` page URL into a [`MediaRecord`]: title,
//! description, timestamp, duration, thumbnail and an ordered list of
//! playable formats (progressive files plus HDS/HLS manifest variants).
//!
//! # Example
//!
//! ```rust,no_run
//! use drradio::{default_router, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let router = default_router(&ResolverConfig::default())?;
//!     let record = router
//!         .resolve("http://www.dr.dk/radio/ondemand/p3/monte-carlo-265")
//!         .await?;
//!     println!("{} ({} formats)", record.title, record.formats.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http_client;
pub mod meta;
pub mod stream;

pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use http_client::HttpFetcher;
pub use stream::providers::{default_router, DrRadioProvider};
pub use stream::{FormatDescriptor, MediaRecord, ProviderRouter, StreamProvider};

/// Version of drradio
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
