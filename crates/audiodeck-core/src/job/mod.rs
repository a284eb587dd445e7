//! Download jobs: identity, state and the in-memory registry.
//!
//! A job is created `queued` only after its source passed validation, the
//! metadata lookup and the duration gate. From there it moves to
//! `downloading` when its origin slot is acquired and ends `complete` or
//! `error`; terminal states are never left. Only the owning pipeline task
//! writes to a job, through its [`JobHandle`].

mod registry;
pub mod sampler;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::origin::OriginKey;

pub use registry::{JobHandle, JobRegistry};

/// Opaque job identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short prefix used to keep output filenames unique.
    pub fn prefix(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Downloading,
    Complete,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Downloading => "downloading",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
        };
        f.pad(s)
    }
}

/// Snapshot of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub origin: OriginKey,
    pub status: JobStatus,
    /// 0..=100; only `complete` jobs reach 100.
    pub progress: u8,
    pub downloaded_bytes: u64,
    /// Estimate while downloading, exact once complete.
    pub total_bytes: u64,
    /// Seconds, from the metadata lookup.
    pub video_duration: u64,
    pub output_path: PathBuf,
    pub error: Option<String>,
}

impl Job {
    pub fn new(
        id: JobId,
        url: impl Into<String>,
        origin: OriginKey,
        video_duration: u64,
        output_path: PathBuf,
    ) -> Self {
        Self {
            id,
            url: url.into(),
            origin,
            status: JobStatus::Queued,
            progress: 0,
            downloaded_bytes: 0,
            total_bytes: 0,
            video_duration,
            output_path,
            error: None,
        }
    }
}
