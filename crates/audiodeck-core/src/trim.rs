//! Trim an existing clip into a new one.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::TrimError;
use crate::expiry::write_expiry_meta;
use crate::filename::trim_output_filename;
use crate::tools::{AudioTrimmer, TrimSpec};

/// Trim request as sent by clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimRequest {
    /// Bare filename inside the clips directory.
    pub filename: String,
    pub start_time: f64,
    pub end_time: f64,
    pub new_name: String,
}

/// Runs trims against files in the clips directory.
#[derive(Clone)]
pub struct TrimExecutor {
    clips_dir: PathBuf,
    trimmer: Arc<dyn AudioTrimmer>,
    clip_ttl: Duration,
}

/// A bare filename: no separators, no `..`, not hidden-relative.
fn is_bare_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
        && name != "."
}

fn validate(req: &TrimRequest) -> Result<(), TrimError> {
    if req.filename.trim().is_empty() || req.new_name.trim().is_empty() {
        return Err(TrimError::Validation(
            "filename, startTime, endTime and newName are required".to_string(),
        ));
    }
    if !is_bare_filename(&req.filename) {
        return Err(TrimError::Validation(format!(
            "invalid filename: {}",
            req.filename
        )));
    }
    if !req.start_time.is_finite() || !req.end_time.is_finite() || req.start_time < 0.0 {
        return Err(TrimError::Validation(
            "startTime must be zero or more".to_string(),
        ));
    }
    if req.end_time <= req.start_time {
        return Err(TrimError::Validation(
            "endTime must be after startTime".to_string(),
        ));
    }
    Ok(())
}

impl TrimExecutor {
    pub fn new(clips_dir: PathBuf, trimmer: Arc<dyn AudioTrimmer>, clip_ttl: Duration) -> Self {
        Self {
            clips_dir,
            trimmer,
            clip_ttl,
        }
    }

    /// Produce the trimmed clip; returns its filename within the clips dir.
    pub async fn trim(&self, req: &TrimRequest) -> Result<String, TrimError> {
        validate(req)?;

        let input = self.clips_dir.join(&req.filename);
        match tokio::fs::metadata(&input).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(TrimError::SourceMissing(req.filename.clone())),
        }

        let out_name = trim_output_filename(&req.new_name);
        let output = self.clips_dir.join(&out_name);
        let spec = TrimSpec {
            input,
            start_seconds: req.start_time,
            duration_seconds: req.end_time - req.start_time,
            output: output.clone(),
        };
        tracing::info!(source = %req.filename, output = %out_name, start = req.start_time, end = req.end_time, "trimming clip");
        if let Err(e) = self.trimmer.trim(&spec).await {
            tracing::warn!(source = %req.filename, error = %e, "trim failed");
            let _ = tokio::fs::remove_file(&output).await;
            return Err(TrimError::Tool(e));
        }

        write_expiry_meta(&output, self.clip_ttl, Some(req.filename.clone())).await;
        Ok(out_name)
    }
}
