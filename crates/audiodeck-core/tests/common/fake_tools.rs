//! In-process stand-ins for yt-dlp and ffmpeg.
//!
//! `FakeExtractor` answers metadata from fixed strings and "downloads" by
//! writing files the way the real tool does: an intermediate `.webm.part`
//! that grows, then the final output.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use audiodeck_core::origin::RequestProfile;
use audiodeck_core::tools::{
    AudioTrimmer, FetchRequest, MediaExtractor, RawMetadata, ToolError, TrimSpec,
};

#[derive(Debug, Clone)]
pub enum FetchBehavior {
    /// Grow an intermediate file, then write `n` bytes to the output.
    WriteBytes(u64),
    /// Create a sparse output of `n` bytes (for oversized files).
    WriteSparse(u64),
    /// Exit nonzero with this diagnostic, leaving a partial file behind.
    Fail(String),
    /// Exit zero without producing anything.
    NoOutput,
}

pub struct FakeExtractor {
    title: String,
    duration: String,
    metadata_error: Option<String>,
    behavior: FetchBehavior,
    delay: Duration,
    probe: Option<u64>,
    size_hangs: bool,
    metadata_calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    fetch_order: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn new(title: &str, duration: &str) -> Self {
        Self {
            title: title.to_string(),
            duration: duration.to_string(),
            metadata_error: None,
            behavior: FetchBehavior::WriteBytes(500_000),
            delay: Duration::from_millis(60),
            probe: None,
            size_hangs: false,
            metadata_calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            fetch_order: Mutex::new(Vec::new()),
        }
    }

    pub fn with_behavior(mut self, behavior: FetchBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_probe(mut self, bytes: u64) -> Self {
        self.probe = Some(bytes);
        self
    }

    /// Size lookups never answer.
    pub fn with_hanging_size(mut self) -> Self {
        self.size_hangs = true;
        self
    }

    pub fn failing_metadata(mut self, diagnostic: &str) -> Self {
        self.metadata_error = Some(diagnostic.to_string());
        self
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous tool invocations observed.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// URLs in the order their fetches started.
    pub fn fetch_order(&self) -> Vec<String> {
        self.fetch_order.lock().unwrap().clone()
    }

    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    async fn produce(&self, output: &Path) -> Result<(), ToolError> {
        let part = part_path(output);
        let step = self.delay / 3;
        match &self.behavior {
            FetchBehavior::WriteBytes(n) => {
                std::fs::write(&part, vec![0u8; (*n / 4) as usize]).unwrap();
                tokio::time::sleep(step).await;
                std::fs::write(&part, vec![0u8; (*n / 2) as usize]).unwrap();
                tokio::time::sleep(step).await;
                std::fs::write(output, vec![0u8; *n as usize]).unwrap();
                std::fs::remove_file(&part).unwrap();
                tokio::time::sleep(step).await;
                Ok(())
            }
            FetchBehavior::WriteSparse(n) => {
                tokio::time::sleep(self.delay).await;
                let file = std::fs::File::create(output).unwrap();
                file.set_len(*n).unwrap();
                Ok(())
            }
            FetchBehavior::Fail(diagnostic) => {
                std::fs::write(&part, vec![0u8; 4096]).unwrap();
                tokio::time::sleep(self.delay).await;
                Err(ToolError::new("yt-dlp", Some(1), diagnostic.clone()))
            }
            FetchBehavior::NoOutput => {
                tokio::time::sleep(self.delay).await;
                Ok(())
            }
        }
    }
}

pub fn part_path(output: &Path) -> PathBuf {
    let mut name = output.with_extension("").into_os_string();
    name.push(".webm.part");
    PathBuf::from(name)
}

#[async_trait]
impl MediaExtractor for FakeExtractor {
    async fn fetch_metadata(
        &self,
        _url: &str,
        _profile: &RequestProfile,
        _cookies: Option<&str>,
    ) -> Result<RawMetadata, ToolError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.enter();
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.leave();
        if let Some(diagnostic) = &self.metadata_error {
            return Err(ToolError::new("yt-dlp", Some(1), diagnostic.clone()));
        }
        Ok(RawMetadata {
            title: self.title.clone(),
            duration: self.duration.clone(),
        })
    }

    async fn probe_size(&self, _url: &str, _profile: &RequestProfile) -> Option<u64> {
        if self.size_hangs {
            std::future::pending::<()>().await;
        }
        self.probe
    }

    async fn fetch_audio(&self, request: &FetchRequest) -> Result<(), ToolError> {
        self.fetch_order.lock().unwrap().push(request.url.clone());
        self.enter();
        let result = self.produce(&request.output_path).await;
        self.leave();
        result
    }
}

/// Trimmer that copies the input to the output.
#[derive(Default)]
pub struct CopyTrimmer;

#[async_trait]
impl AudioTrimmer for CopyTrimmer {
    async fn trim(&self, spec: &TrimSpec) -> Result<(), ToolError> {
        std::fs::copy(&spec.input, &spec.output)
            .map(|_| ())
            .map_err(|e| ToolError::new("ffmpeg", None, e.to_string()))
    }
}
