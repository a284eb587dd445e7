//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

pub mod fake_tools;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use audiodeck_core::config::DeckConfig;
use audiodeck_core::job::JobId;
use audiodeck_core::pipeline::Pipeline;
use audiodeck_core::progress::ProgressMessage;

use fake_tools::FakeExtractor;

/// Fast ticks, short retention, clips in `dir`.
pub fn test_config(dir: &Path) -> DeckConfig {
    DeckConfig {
        clips_dir: Some(dir.to_path_buf()),
        progress_interval_ms: 10,
        job_retention_secs: 1,
        ..DeckConfig::default()
    }
}

pub fn pipeline(cfg: &DeckConfig, fake: &Arc<FakeExtractor>) -> Pipeline {
    let clips = cfg.clips_dir.clone().expect("test config sets clips_dir");
    Pipeline::new(cfg, clips, fake.clone())
}

/// Every payload a fresh subscriber sees until the stream ends.
pub async fn follow(pipeline: &Pipeline, id: &JobId) -> Vec<ProgressMessage> {
    let stream = pipeline.hub().subscribe(id).into_stream();
    tokio::time::timeout(Duration::from_secs(10), stream.collect::<Vec<_>>())
        .await
        .expect("job should reach a terminal state")
}

/// Last payload of a finished stream, unpacked.
pub fn last_progress(messages: &[ProgressMessage]) -> (u8, u64, u64, String, Option<String>) {
    match messages.last() {
        Some(ProgressMessage::Progress {
            progress,
            downloaded_bytes,
            total_bytes,
            status,
            error,
            ..
        }) => (
            *progress,
            *downloaded_bytes,
            *total_bytes,
            status.to_string(),
            error.clone(),
        ),
        other => panic!("expected a progress payload, got {other:?}"),
    }
}
