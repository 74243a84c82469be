//! Resolver configuration, optionally loaded from a TOML file.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ResolveError, Result};

const DEFAULT_BASE_URL: &str = "http://www.dr.dk";
const DEFAULT_USER_AGENT: &str = concat!("drradio/", env!("CARGO_PKG_VERSION"));

/// Settings shared by the HTTP fetcher and the DR radio provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Provider origin; program-card and thumbnail URLs are derived from it.
    pub base_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Upper bound on manifest fetches in flight during one resolution.
    pub manifest_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            manifest_concurrency: 4,
        }
    }
}

impl ResolverConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content).map_err(|e| ResolveError::Config(e.to_string()))
    }

    /// Load from `path`. Unlike optional dotfiles, an explicitly named file
    /// that does not exist is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ResolveError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&content)
            .map_err(|e| ResolveError::Config(format!("invalid TOML in {}: {e}", path.display())))
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.normalize();
        self
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self.manifest_concurrency = self.manifest_concurrency.max(1);
    }
}
