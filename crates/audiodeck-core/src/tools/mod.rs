//! External media tools.
//!
//! The engine only depends on the [`MediaExtractor`] and [`AudioTrimmer`]
//! traits; [`YtDlp`] and [`Ffmpeg`] are the process-backed implementations
//! used by the binary. Tests substitute in-process fakes.

mod classify;
mod ffmpeg;
mod process;
mod ytdlp;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::origin::RequestProfile;

pub use classify::{classify_diagnostic, FailureKind};
pub use ffmpeg::Ffmpeg;
pub use ytdlp::YtDlp;

/// Failure reported by an external tool: nonzero exit, spawn failure, or
/// unusable output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{tool} failed: {diagnostic}")]
pub struct ToolError {
    pub tool: String,
    /// Process exit code; `None` when it never started or was killed by a signal.
    pub exit_code: Option<i32>,
    /// Tail of the tool's diagnostic output.
    pub diagnostic: String,
}

impl ToolError {
    pub fn new(tool: &str, exit_code: Option<i32>, diagnostic: impl Into<String>) -> Self {
        Self {
            tool: tool.to_string(),
            exit_code,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        classify_diagnostic(&self.diagnostic)
    }
}

/// Raw metadata as printed by the extractor; parsing happens in the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMetadata {
    pub title: String,
    /// Duration as `HH:MM:SS`, `MM:SS` or seconds; may be empty or `NA`.
    pub duration: String,
}

/// Everything the fetch+convert tool needs to produce one audio file.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub profile: RequestProfile,
    /// Final destination. Intermediate files share its stem.
    pub output_path: PathBuf,
    pub audio_format: String,
    pub audio_bitrate: String,
    /// Browser cookie source, when allowed for this origin.
    pub cookies: Option<String>,
}

/// Bounded trim of an existing audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimSpec {
    pub input: PathBuf,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub output: PathBuf,
}

/// Media metadata extractor and fetch+convert tool.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Title and duration for `url`.
    async fn fetch_metadata(
        &self,
        url: &str,
        profile: &RequestProfile,
        cookies: Option<&str>,
    ) -> Result<RawMetadata, ToolError>;

    /// Approximate size in bytes of the audio that `fetch_audio` would
    /// download, if the source reports one.
    async fn probe_size(&self, url: &str, profile: &RequestProfile) -> Option<u64>;

    /// Download and convert to audio at `request.output_path`.
    async fn fetch_audio(&self, request: &FetchRequest) -> Result<(), ToolError>;
}

/// One-shot audio trim/convert tool.
#[async_trait]
pub trait AudioTrimmer: Send + Sync {
    async fn trim(&self, spec: &TrimSpec) -> Result<(), ToolError>;
}
