//! Streaming service providers

pub mod dr_radio;

pub use dr_radio::DrRadioProvider;

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::stream::provider::ProviderRouter;

/// Router with every built-in provider, backed by real HTTP fetches.
pub fn default_router(config: &ResolverConfig) -> Result<ProviderRouter> {
    Ok(ProviderRouter::new().with_provider(Box::new(DrRadioProvider::new(config)?)))
}
