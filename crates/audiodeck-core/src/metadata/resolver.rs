use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use super::parse::{parse_duration, truncate_title};
use super::{MediaMetadata, ResolverSettings};
use crate::error::ExtractionError;
use crate::limiter::OriginLimiter;
use crate::origin::{OriginKey, ProfileTable, RequestProfile};
use crate::tools::{MediaExtractor, ToolError};

type SharedLookup = Shared<BoxFuture<'static, Result<MediaMetadata, ExtractionError>>>;

struct CacheEntry {
    value: MediaMetadata,
    fetched_at: Instant,
}

#[derive(Default)]
struct State {
    cache: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, SharedLookup>,
}

struct Inner {
    extractor: Arc<dyn MediaExtractor>,
    limiter: OriginLimiter,
    profiles: Arc<ProfileTable>,
    settings: ResolverSettings,
    state: Mutex<State>,
}

/// Title/duration lookups with a TTL cache and one in-flight lookup per URL.
///
/// Lookups run inside the origin's limiter queue, so they share the
/// per-origin budget with downloads. Failures are never cached.
#[derive(Clone)]
pub struct MetadataResolver {
    inner: Arc<Inner>,
}

impl MetadataResolver {
    pub fn new(
        extractor: Arc<dyn MediaExtractor>,
        limiter: OriginLimiter,
        profiles: Arc<ProfileTable>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                extractor,
                limiter,
                profiles,
                settings,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Cached metadata if fresh, else join or start a lookup.
    pub async fn resolve(&self, url: &str) -> Result<MediaMetadata, ExtractionError> {
        let lookup = {
            let mut state = self.inner.lock();
            if let Some(entry) = state.cache.get(url) {
                if entry.fetched_at.elapsed() < self.inner.settings.ttl {
                    return Ok(entry.value.clone());
                }
                state.cache.remove(url);
            }
            match state.in_flight.get(url) {
                Some(shared) => shared.clone(),
                None => {
                    let shared = self.start_lookup(url);
                    state.in_flight.insert(url.to_string(), shared.clone());
                    shared
                }
            }
        };
        lookup.await
    }

    /// Title for display. When the platform refuses access and the origin's
    /// profile has a fallback for that kind of failure, answers with its label.
    pub async fn title(&self, url: &str) -> Result<String, ExtractionError> {
        match self.resolve(url).await {
            Ok(meta) => Ok(meta.title),
            Err(e) => {
                let label = OriginKey::from_url(url)
                    .ok()
                    .and_then(|origin| self.inner.profiles.get(&origin).fallback_title)
                    .and_then(|fallback| fallback.label(url, e.kind()));
                match label {
                    Some(label) => {
                        tracing::info!(url, %label, kind = ?e.kind(), "using fallback title");
                        Ok(label)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Number of cached entries, fresh or stale.
    pub fn cached_len(&self) -> usize {
        self.inner.lock().cache.len()
    }

    /// The lookup runs in its own task so it finishes (and fills the cache)
    /// even if every waiter goes away.
    fn start_lookup(&self, url: &str) -> SharedLookup {
        let inner = Arc::clone(&self.inner);
        let owned = url.to_string();
        let task = tokio::spawn(async move {
            let result = inner.lookup(&owned).await;
            inner.record(&owned, &result);
            result
        });
        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(ExtractionError::Tool(ToolError::new(
                    "resolver",
                    None,
                    format!("metadata task failed: {e}"),
                ))),
            }
        }
        .boxed()
        .shared()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, url: &str, result: &Result<MediaMetadata, ExtractionError>) {
        let mut state = self.lock();
        state.in_flight.remove(url);
        if let Ok(value) = result {
            state.cache.insert(
                url.to_string(),
                CacheEntry {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
    }

    async fn lookup(&self, url: &str) -> Result<MediaMetadata, ExtractionError> {
        let origin = OriginKey::from_url(url).map_err(|e| {
            ExtractionError::Tool(ToolError::new("resolver", None, format!("{e:#}")))
        })?;
        let profile = self.profiles.get(&origin).clone();
        let cookies = profile
            .cookies_for(self.settings.cookies.as_deref())
            .map(str::to_string);

        let raw = self
            .limiter
            .enqueue(&origin, async {
                let first = self.fetch_once(url, &profile, cookies.as_deref()).await;
                match first {
                    Err(e) if cookies.is_some() && e.kind().allows_cookie_fallback() => {
                        tracing::info!(%origin, "lookup refused with cookies; retrying without");
                        self.fetch_once(url, &profile, None).await
                    }
                    other => other,
                }
            })
            .await?;

        let title = raw.title.trim();
        if title.is_empty() {
            return Err(ExtractionError::EmptyOutput);
        }
        let meta = MediaMetadata {
            title: truncate_title(title),
            duration_seconds: parse_duration(&raw.duration),
        };
        tracing::debug!(%origin, url, duration = meta.duration_seconds, "metadata resolved");
        Ok(meta)
    }

    async fn fetch_once(
        &self,
        url: &str,
        profile: &RequestProfile,
        cookies: Option<&str>,
    ) -> Result<crate::tools::RawMetadata, ExtractionError> {
        let timeout: Duration = self.settings.timeout;
        let fetch = self.extractor.fetch_metadata(url, profile, cookies);
        match tokio::time::timeout(timeout, fetch).await {
            Ok(result) => result.map_err(ExtractionError::from),
            Err(_) => {
                tracing::warn!(url, ?timeout, "metadata lookup timed out");
                Err(ExtractionError::TimedOut)
            }
        }
    }
}
