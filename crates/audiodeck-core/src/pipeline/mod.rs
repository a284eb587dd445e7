//! Download/convert pipeline.
//!
//! Coordinates a submission end to end:
//! validation → metadata lookup → duration gate → job registration →
//! (origin slot) size probe → fetch + sampling → output validation → sidecar.
//!
//! Pre-job failures are returned to the caller as [`SubmitError`]; once a job
//! exists, failures are only recorded on it and surface through the
//! [`ProgressHub`].

mod run;
mod validate;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::DeckConfig;
use crate::error::SubmitError;
use crate::filename::job_output_filename;
use crate::job::{Job, JobId, JobRegistry};
use crate::limiter::OriginLimiter;
use crate::metadata::{MediaMetadata, MetadataResolver, ResolverSettings};
use crate::origin::ProfileTable;
use crate::progress::ProgressHub;
use crate::tools::MediaExtractor;

pub use validate::{validate_submission, validate_url};

/// Request to fetch `url` as a clip named `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub url: String,
    #[serde(alias = "desiredName")]
    pub name: String,
}

/// Returned as soon as a job is queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub job_id: JobId,
    pub video_duration: u64,
}

/// Answer to a duration pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationCheck {
    pub duration: u64,
    pub is_too_long: bool,
    pub max_duration: u64,
}

#[derive(Debug, Clone)]
struct Settings {
    max_duration_secs: u64,
    audio_format: String,
    audio_bitrate: String,
    progress_interval: Duration,
    job_retention: Duration,
    clip_ttl: Duration,
    assumed_bitrate_bytes_per_sec: u64,
    /// Bound on the pre-download size lookup; a timeout falls back to the estimate.
    size_lookup_timeout: Duration,
    cookies: Option<String>,
}

struct Inner {
    settings: Settings,
    clips_dir: PathBuf,
    registry: JobRegistry,
    hub: ProgressHub,
    resolver: MetadataResolver,
    limiter: OriginLimiter,
    profiles: Arc<ProfileTable>,
    extractor: Arc<dyn MediaExtractor>,
}

/// Owns every piece of shared job state. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

impl Pipeline {
    /// Wire the registry, hub, limiter and resolver from configuration using
    /// the built-in request profiles.
    pub fn new(cfg: &DeckConfig, clips_dir: PathBuf, extractor: Arc<dyn MediaExtractor>) -> Self {
        Self::with_profiles(cfg, clips_dir, extractor, ProfileTable::builtin())
    }

    pub fn with_profiles(
        cfg: &DeckConfig,
        clips_dir: PathBuf,
        extractor: Arc<dyn MediaExtractor>,
        profiles: ProfileTable,
    ) -> Self {
        let profiles = Arc::new(profiles);
        let registry = JobRegistry::new();
        let hub = ProgressHub::new(registry.clone(), cfg.progress_interval());
        let limiter = OriginLimiter::new(cfg.max_concurrent_per_origin);
        let resolver = MetadataResolver::new(
            Arc::clone(&extractor),
            limiter.clone(),
            Arc::clone(&profiles),
            ResolverSettings::from_config(cfg),
        );
        let settings = Settings {
            max_duration_secs: cfg.max_duration_secs(),
            audio_format: cfg.audio_format.clone(),
            audio_bitrate: cfg.audio_bitrate.clone(),
            progress_interval: cfg.progress_interval(),
            job_retention: cfg.job_retention(),
            clip_ttl: cfg.clip_ttl(),
            assumed_bitrate_bytes_per_sec: cfg.assumed_bitrate_bytes_per_sec,
            size_lookup_timeout: cfg.metadata_timeout(),
            cookies: cfg.cookie_source(),
        };
        Self {
            inner: Arc::new(Inner {
                settings,
                clips_dir,
                registry,
                hub,
                resolver,
                limiter,
                profiles,
                extractor,
            }),
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.inner.registry
    }

    pub fn hub(&self) -> &ProgressHub {
        &self.inner.hub
    }

    pub fn limiter(&self) -> &OriginLimiter {
        &self.inner.limiter
    }

    pub fn resolver(&self) -> &MetadataResolver {
        &self.inner.resolver
    }

    pub fn clips_dir(&self) -> &PathBuf {
        &self.inner.clips_dir
    }

    pub fn max_duration_secs(&self) -> u64 {
        self.inner.settings.max_duration_secs
    }

    /// Validate, look up metadata, gate on duration, then queue the job and
    /// return immediately. The fetch runs in a spawned task.
    pub async fn submit(&self, req: SubmitRequest) -> Result<Submission, SubmitError> {
        let url = req.url.trim();
        let origin = validate_submission(url, &req.name)?;

        let meta = self.inner.resolver.resolve(url).await.map_err(|e| {
            tracing::info!(url, %origin, error = %e, details = %e.details(), "metadata lookup failed");
            SubmitError::Extraction(e)
        })?;
        self.check_limit(&meta)?;

        tokio::fs::create_dir_all(&self.inner.clips_dir).await?;
        let id = JobId::new();
        let output = self.inner.clips_dir.join(job_output_filename(
            &req.name,
            &id.prefix(),
            &self.inner.settings.audio_format,
        ));
        let handle = self.inner.registry.register(Job::new(
            id,
            url,
            origin.clone(),
            meta.duration_seconds,
            output,
        ));
        self.inner.hub.open(id);
        tracing::info!(job_id = %id, %origin, duration = meta.duration_seconds, "job queued");

        tokio::spawn(self.clone().run_job(handle));

        Ok(Submission {
            job_id: id,
            video_duration: meta.duration_seconds,
        })
    }

    /// Duration pre-check for a link, without creating a job.
    pub async fn check_duration(&self, url: &str) -> Result<DurationCheck, SubmitError> {
        let url = url.trim();
        validate_url(url)?;
        let meta = self.inner.resolver.resolve(url).await?;
        let max_duration = self.inner.settings.max_duration_secs;
        Ok(DurationCheck {
            duration: meta.duration_seconds,
            is_too_long: meta.duration_seconds > max_duration,
            max_duration,
        })
    }

    /// Display title for a link, with per-origin fallback labels.
    pub async fn title(&self, url: &str) -> Result<String, SubmitError> {
        let url = url.trim();
        validate_url(url)?;
        Ok(self.inner.resolver.title(url).await?)
    }

    fn check_limit(&self, meta: &MediaMetadata) -> Result<(), SubmitError> {
        let max_duration = self.inner.settings.max_duration_secs;
        if meta.duration_seconds > max_duration {
            return Err(SubmitError::DurationExceeded {
                duration: meta.duration_seconds,
                max_duration,
            });
        }
        Ok(())
    }
}
