//! Resolution errors
//!
//! Every failure a resolution can end in. [`ResolveError::GeoRestricted`] is
//! the only *expected* condition: callers should show its message as-is
//! instead of a generic failure.

use thiserror::Error;

/// Errors produced while resolving a page URL into a [`MediaRecord`].
///
/// [`MediaRecord`]: crate::stream::MediaRecord
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unsupported URL: {url}")]
    NoMatch { url: String },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Malformed {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{message}")]
    GeoRestricted {
        message: String,
        /// ISO 3166 codes of the countries the item is available in.
        countries: Vec<String>,
    },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

impl ResolveError {
    pub fn no_match(url: impl Into<String>) -> Self {
        Self::NoMatch { url: url.into() }
    }

    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for conditions that are not faults of this crate or the
    /// provider and should be reported to the user verbatim.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::GeoRestricted { .. })
    }
}
