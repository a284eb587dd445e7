//! Disk-size progress sampler.
//!
//! The fetch tool's own progress output is not parsed; instead the sampler
//! polls the output path and its intermediates and turns the size it finds
//! into a liveness percentage.

use std::convert::Infallible;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::JobHandle;

/// Intermediate files the fetch tool may write next to the final output,
/// in the order they are checked.
pub const INTERMEDIATE_SUFFIXES: &[&str] = &[
    ".mp3.part",
    ".m4a",
    ".m4a.part",
    ".webm",
    ".webm.part",
    ".opus",
    ".opus.part",
    ".mp4",
    ".mp4.part",
    ".temp.mp3",
];

const NOISE_BYTES: u64 = 1024;
const MIN_INTERMEDIATE_ESTIMATE: u64 = 1024 * 1024;
const FINAL_CAP: u8 = 99;
const INTERMEDIATE_CAP: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Final,
    Intermediate,
}

/// One progress reading for the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub progress: u8,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
}

/// Paths to poll, final output first.
pub fn candidate_paths(output: &Path) -> Vec<(PathBuf, CandidateKind)> {
    let stem = output.with_extension("");
    let mut paths = vec![(output.to_path_buf(), CandidateKind::Final)];
    for suffix in INTERMEDIATE_SUFFIXES {
        let mut name: OsString = stem.clone().into_os_string();
        name.push(suffix);
        paths.push((PathBuf::from(name), CandidateKind::Intermediate));
    }
    paths
}

/// First candidate that exists as a regular file, with its size.
pub async fn probe(candidates: &[(PathBuf, CandidateKind)]) -> Option<(CandidateKind, u64)> {
    for (path, kind) in candidates {
        if let Ok(meta) = tokio::fs::metadata(path).await {
            if meta.is_file() {
                return Some((*kind, meta.len()));
            }
        }
    }
    None
}

/// Size-to-percentage state for one job.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    estimate: u64,
    last_size: u64,
}

impl ProgressEstimator {
    pub fn new(estimate: u64) -> Self {
        Self {
            estimate,
            last_size: 0,
        }
    }

    pub fn estimate(&self) -> u64 {
        self.estimate
    }

    /// Turn an observed file size into a sample. `None` when the change
    /// since the last reading is below the noise threshold.
    pub fn observe(&mut self, kind: CandidateKind, size: u64) -> Option<Sample> {
        if size.abs_diff(self.last_size) < NOISE_BYTES {
            return None;
        }
        self.last_size = size;

        let (total, cap) = match kind {
            CandidateKind::Final => (self.estimate.max(size), FINAL_CAP),
            CandidateKind::Intermediate => {
                let grown = (size as f64 * 1.2) as u64;
                self.estimate = self.estimate.max(grown).max(MIN_INTERMEDIATE_ESTIMATE);
                (self.estimate, INTERMEDIATE_CAP)
            }
        };
        let pct = if total == 0 {
            0
        } else {
            ((size as f64 / total as f64) * 100.0).round() as u64
        };
        Some(Sample {
            progress: pct.min(cap as u64) as u8,
            downloaded_bytes: size,
            total_bytes: total,
        })
    }
}

/// Poll `output` every `interval` and feed readings into `handle`. Never
/// finishes on its own; the pipeline races it against the fetch.
pub async fn watch(
    handle: &JobHandle,
    output: &Path,
    estimate: u64,
    interval: Duration,
) -> Infallible {
    let candidates = candidate_paths(output);
    let mut estimator = ProgressEstimator::new(estimate);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if let Some((kind, size)) = probe(&candidates).await {
            if let Some(sample) = estimator.observe(kind, size) {
                tracing::trace!(job_id = %handle.id(), ?kind, size, progress = sample.progress, "progress sample");
                handle.record_progress(sample);
            }
        }
    }
}
