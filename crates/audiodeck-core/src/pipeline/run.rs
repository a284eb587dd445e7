//! Body of one download job, from slot acquisition to eviction.

use std::io::ErrorKind;
use std::path::Path;

use crate::config::OUTPUT_SIZE_CAP_BYTES;
use crate::error::{ExtractionError, JobFailure};
use crate::expiry::write_expiry_meta;
use crate::job::sampler::{self, candidate_paths};
use crate::job::{Job, JobHandle};
use crate::origin::RequestProfile;
use crate::tools::FetchRequest;

use super::Pipeline;

impl Pipeline {
    /// Run a registered job to a terminal state, then evict it after the
    /// retention period.
    pub(super) async fn run_job(self, handle: JobHandle) {
        let Some(job) = handle.snapshot() else {
            return;
        };
        let inner = &self.inner;
        let profile = inner.profiles.get(&job.origin).clone();

        let outcome = inner
            .limiter
            .enqueue(&job.origin, self.download(&handle, &job, &profile))
            .await;

        match outcome {
            Ok(size) => {
                write_expiry_meta(&job.output_path, inner.settings.clip_ttl, None).await;
                handle.complete(size);
                tracing::info!(job_id = %job.id, origin = %job.origin, size, "job complete");
            }
            Err(failure) => {
                tracing::warn!(job_id = %job.id, origin = %job.origin, error = %failure, "job failed");
                if let JobFailure::Extraction(e) = &failure {
                    tracing::debug!(job_id = %job.id, details = %e.details(), "extractor diagnostic");
                }
                remove_leftovers(&job.output_path).await;
                handle.fail(failure.to_string());
            }
        }
        inner.hub.close(&job.id);

        tokio::time::sleep(inner.settings.job_retention).await;
        handle.evict();
    }

    /// Size probe, fetch with concurrent sampling, output validation.
    /// Runs while holding the origin slot.
    async fn download(
        &self,
        handle: &JobHandle,
        job: &Job,
        profile: &RequestProfile,
    ) -> Result<u64, JobFailure> {
        let inner = &self.inner;
        let timeout = inner.settings.size_lookup_timeout;
        let sized = tokio::time::timeout(timeout, inner.extractor.probe_size(&job.url, profile));
        let reported = sized.await.unwrap_or_else(|_| {
            tracing::warn!(job_id = %job.id, ?timeout, "size lookup timed out; estimating");
            None
        });
        let estimate = match reported {
            Some(bytes) => bytes,
            None => job
                .video_duration
                .saturating_mul(inner.settings.assumed_bitrate_bytes_per_sec),
        };
        handle.mark_downloading(estimate);
        tracing::debug!(job_id = %job.id, estimate, "download started");

        let request = FetchRequest {
            url: job.url.clone(),
            profile: profile.clone(),
            output_path: job.output_path.clone(),
            audio_format: inner.settings.audio_format.clone(),
            audio_bitrate: inner.settings.audio_bitrate.clone(),
            cookies: profile
                .cookies_for(inner.settings.cookies.as_deref())
                .map(str::to_string),
        };

        let fetched = tokio::select! {
            result = inner.extractor.fetch_audio(&request) => result,
            never = sampler::watch(handle, &job.output_path, estimate, inner.settings.progress_interval) => match never {},
        };
        fetched.map_err(|e| JobFailure::Extraction(ExtractionError::Tool(e)))?;

        validate_output(&job.output_path).await
    }
}

/// Size of a finished output, rejecting missing, empty and oversized files.
/// Oversized files are deleted.
pub(super) async fn validate_output(path: &Path) -> Result<u64, JobFailure> {
    let size = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return Err(JobFailure::OutputMissing),
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(JobFailure::OutputMissing),
        Err(e) => return Err(JobFailure::Io(e)),
    };
    if size == 0 {
        return Err(JobFailure::OutputMissing);
    }
    if size > OUTPUT_SIZE_CAP_BYTES {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "could not remove oversized output");
        }
        return Err(JobFailure::OutputTooLarge {
            size,
            cap: OUTPUT_SIZE_CAP_BYTES,
        });
    }
    Ok(size)
}

/// Best-effort removal of the output and intermediates of a failed job.
async fn remove_leftovers(output: &Path) {
    for (path, _) in candidate_paths(output) {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "removed leftover file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove leftover file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_and_empty_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.mp3");
        assert!(matches!(validate_output(&out).await, Err(JobFailure::OutputMissing)));
        std::fs::write(&out, b"").unwrap();
        assert!(matches!(validate_output(&out).await, Err(JobFailure::OutputMissing)));
        std::fs::write(&out, vec![1u8; 500]).unwrap();
        assert_eq!(validate_output(&out).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn oversized_output_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("big.mp3");
        let file = std::fs::File::create(&out).unwrap();
        file.set_len(OUTPUT_SIZE_CAP_BYTES + 1).unwrap();
        drop(file);

        let err = validate_output(&out).await.unwrap_err();
        assert!(matches!(err, JobFailure::OutputTooLarge { .. }));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn leftovers_removed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x.mp3");
        std::fs::write(dir.path().join("x.webm.part"), b"partial").unwrap();
        std::fs::write(dir.path().join("x.m4a"), b"partial").unwrap();
        std::fs::write(dir.path().join("other.mp3"), b"keep").unwrap();
        remove_leftovers(&out).await;
        assert!(!dir.path().join("x.webm.part").exists());
        assert!(!dir.path().join("x.m4a").exists());
        assert!(dir.path().join("other.mp3").exists());
    }
}
