use serde::Serialize;

use crate::job::{Job, JobStatus};

/// Payload pushed to progress subscribers over either transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressMessage {
    #[serde(rename_all = "camelCase")]
    Progress {
        progress: u8,
        downloaded_bytes: u64,
        total_bytes: u64,
        status: JobStatus,
        error: Option<String>,
        video_duration: u64,
    },
    /// Acknowledgement for an id with no known state.
    #[serde(rename_all = "camelCase")]
    Connected { download_id: String },
}

impl ProgressMessage {
    pub fn from_job(job: &Job) -> Self {
        ProgressMessage::Progress {
            progress: job.progress,
            downloaded_bytes: job.downloaded_bytes,
            total_bytes: job.total_bytes,
            status: job.status,
            error: job.error.clone(),
            video_duration: job.video_duration,
        }
    }

    pub fn connected(download_id: impl Into<String>) -> Self {
        ProgressMessage::Connected {
            download_id: download_id.into(),
        }
    }

    /// Last message a subscriber will receive: a terminal job state or an ack.
    pub fn ends_stream(&self) -> bool {
        match self {
            ProgressMessage::Progress { status, .. } => status.is_terminal(),
            ProgressMessage::Connected { .. } => true,
        }
    }

    pub fn status(&self) -> Option<JobStatus> {
        match self {
            ProgressMessage::Progress { status, .. } => Some(*status),
            ProgressMessage::Connected { .. } => None,
        }
    }

    /// SSE event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            ProgressMessage::Progress { .. } => "progress",
            ProgressMessage::Connected { .. } => "connected",
        }
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}
