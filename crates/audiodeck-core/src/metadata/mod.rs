//! Metadata resolution: title and duration for a source URL.

mod parse;
mod resolver;

use std::time::Duration;

use serde::Serialize;

use crate::config::DeckConfig;

pub use parse::{parse_duration, truncate_title, TITLE_MAX_CHARS};
pub use resolver::MetadataResolver;

/// Resolved, display-ready metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub title: String,
    /// Whole seconds; `0` when the source did not report a usable duration.
    pub duration_seconds: u64,
}

/// Resolver tunables.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub ttl: Duration,
    /// Per-attempt bound on one extractor call.
    pub timeout: Duration,
    /// Browser cookie source, when cookie injection is enabled.
    pub cookies: Option<String>,
}

impl ResolverSettings {
    pub fn from_config(cfg: &DeckConfig) -> Self {
        Self {
            ttl: cfg.metadata_ttl(),
            timeout: cfg.metadata_timeout(),
            cookies: cfg.cookie_source(),
        }
    }
}
