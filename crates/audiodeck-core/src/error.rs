//! Domain error types.
//!
//! Pre-job failures ([`SubmitError`], [`TrimError`]) are returned to the
//! caller; job-time failures ([`JobFailure`]) are rendered into the job's
//! `error` string and only surface through progress payloads.

use crate::tools::{FailureKind, ToolError};

/// Generic "bad link" sentence shared by validation, timeouts and
/// unclassified extractor failures.
pub const CHECK_LINK_MESSAGE: &str = "Could not process this link. Check the link and try again.";

/// Metadata or fetch failure from the extractor. Cloneable so every waiter
/// on a shared in-flight lookup gets its own copy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("{}", .0.kind().user_message())]
    Tool(ToolError),
    #[error("{}", CHECK_LINK_MESSAGE)]
    EmptyOutput,
    #[error("{}", CHECK_LINK_MESSAGE)]
    TimedOut,
}

impl ExtractionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractionError::Tool(e) => e.kind(),
            ExtractionError::EmptyOutput | ExtractionError::TimedOut => FailureKind::Other,
        }
    }

    /// Tool diagnostic or a short description, for logs and `details`.
    pub fn details(&self) -> String {
        match self {
            ExtractionError::Tool(e) => e.diagnostic.clone(),
            ExtractionError::EmptyOutput => "extractor returned no title".to_string(),
            ExtractionError::TimedOut => "metadata lookup timed out".to_string(),
        }
    }
}

impl From<ToolError> for ExtractionError {
    fn from(e: ToolError) -> Self {
        ExtractionError::Tool(e)
    }
}

/// Rejection of a download submission; no job exists when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{}", CHECK_LINK_MESSAGE)]
    Validation(String),
    #[error("Video is too long ({duration}s); the limit is {max_duration}s.")]
    DurationExceeded { duration: u64, max_duration: u64 },
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("could not prepare the clips directory: {0}")]
    Io(#[from] std::io::Error),
}

impl SubmitError {
    /// Machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            SubmitError::Validation(_) => "invalid_request",
            SubmitError::DurationExceeded { .. } => "too_long",
            SubmitError::Extraction(_) => "bad_link",
            SubmitError::Io(_) => "internal",
        }
    }
}

/// Why a job ended in the `error` state.
#[derive(Debug, thiserror::Error)]
pub enum JobFailure {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("The download finished but no audio was produced. Check the link and try again.")]
    OutputMissing,
    #[error("File too large: {size} bytes exceeds the {cap} byte limit.")]
    OutputTooLarge { size: u64, cap: u64 },
    #[error("Could not read the produced audio: {0}")]
    Io(#[from] std::io::Error),
}

/// Trim request failure.
#[derive(Debug, thiserror::Error)]
pub enum TrimError {
    #[error("{0}")]
    Validation(String),
    #[error("File not found: {0}")]
    SourceMissing(String),
    #[error("Trim failed: {}", .0.diagnostic)]
    Tool(#[from] ToolError),
    #[error("Trim I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrimError {
    pub fn reason(&self) -> &'static str {
        match self {
            TrimError::Validation(_) => "invalid_request",
            TrimError::SourceMissing(_) => "not_found",
            TrimError::Tool(_) => "tool_failed",
            TrimError::Io(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_messages_follow_classification() {
        let e = ExtractionError::Tool(ToolError::new(
            "yt-dlp",
            Some(1),
            "ERROR: This video is private",
        ));
        assert_eq!(e.kind(), FailureKind::Unavailable);
        assert!(e.to_string().contains("private"));
        assert_eq!(e.details(), "ERROR: This video is private");
    }

    #[test]
    fn timeout_reads_like_a_bad_link() {
        assert_eq!(ExtractionError::TimedOut.to_string(), CHECK_LINK_MESSAGE);
        assert_eq!(
            SubmitError::Validation("missing url".into()).to_string(),
            CHECK_LINK_MESSAGE
        );
    }

    #[test]
    fn reasons() {
        let too_long = SubmitError::DurationExceeded {
            duration: 1500,
            max_duration: 1200,
        };
        assert_eq!(too_long.reason(), "too_long");
        assert_eq!(
            SubmitError::from(ExtractionError::EmptyOutput).reason(),
            "bad_link"
        );
        assert_eq!(TrimError::SourceMissing("a.mp3".into()).reason(), "not_found");
    }

    #[test]
    fn oversize_message_mentions_too_large() {
        let e = JobFailure::OutputTooLarge { size: 30, cap: 25 };
        assert!(e.to_string().to_lowercase().contains("too large"));
    }
}
