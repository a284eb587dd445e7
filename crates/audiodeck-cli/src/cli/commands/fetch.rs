//! `audiodeck fetch` – run one download job in-process and follow it.

use anyhow::{bail, Result};
use audiodeck_core::config::DeckConfig;
use audiodeck_core::job::JobStatus;
use audiodeck_core::pipeline::SubmitRequest;
use audiodeck_core::progress::ProgressMessage;

use crate::server::AppState;

pub async fn run_fetch(cfg: &DeckConfig, url: &str, name: &str) -> Result<()> {
    let state = AppState::from_config(cfg)?;
    let pipeline = &state.pipeline;
    let submission = pipeline
        .submit(SubmitRequest {
            url: url.to_string(),
            name: name.to_string(),
        })
        .await?;
    println!(
        "Job {} queued ({}s of audio)",
        submission.job_id, submission.video_duration
    );

    let mut sub = pipeline.hub().subscribe(&submission.job_id);
    let mut last: Option<(JobStatus, u8)> = None;
    let mut outcome = None;
    while let Some(message) = sub.next().await {
        let ProgressMessage::Progress {
            progress,
            downloaded_bytes,
            total_bytes,
            status,
            error,
            ..
        } = message
        else {
            continue;
        };
        if last != Some((status, progress)) {
            println!("{status:<12} {progress:>3}%  {downloaded_bytes}/{total_bytes} bytes");
            last = Some((status, progress));
        }
        if status.is_terminal() {
            outcome = Some((status, error));
        }
    }

    match outcome {
        Some((JobStatus::Complete, _)) => {
            if let Some(job) = pipeline.registry().get(&submission.job_id) {
                println!("Saved {}", job.output_path.display());
            }
            Ok(())
        }
        Some((_, error)) => bail!(
            "{}",
            error.unwrap_or_else(|| "download failed".to_string())
        ),
        None => bail!("job {} ended without a final status", submission.job_id),
    }
}
