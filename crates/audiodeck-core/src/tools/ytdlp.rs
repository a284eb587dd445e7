//! `yt-dlp` process adapter.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_captured;
use super::{FetchRequest, MediaExtractor, RawMetadata, ToolError};
use crate::origin::RequestProfile;

const TOOL: &str = "yt-dlp";

/// Extractor backed by the `yt-dlp` binary, using `ffmpeg` for conversion.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    ffmpeg: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ffmpeg: None,
        }
    }

    /// Point `yt-dlp` at a specific ffmpeg binary for post-processing.
    pub fn with_ffmpeg(mut self, ffmpeg: impl Into<PathBuf>) -> Self {
        self.ffmpeg = Some(ffmpeg.into());
        self
    }

    fn base_command(&self, profile: &RequestProfile, cookies: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(base_args(profile, cookies));
        cmd
    }
}

/// Flags shared by every invocation: no playlists, profile headers, cookies.
fn base_args(profile: &RequestProfile, cookies: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--user-agent".to_string(),
        profile.user_agent.clone(),
    ];
    if let Some(referer) = &profile.referer {
        args.push("--referer".to_string());
        args.push(referer.clone());
    }
    for (name, value) in &profile.headers {
        args.push("--add-header".to_string());
        args.push(format!("{name}:{value}"));
    }
    if let Some(source) = cookies {
        args.push("--cookies-from-browser".to_string());
        args.push(source.to_string());
    }
    args
}

/// Output template: the final path with its extension replaced by yt-dlp's
/// `%(ext)s` placeholder so intermediates share the stem.
fn output_template(output: &Path) -> String {
    output.with_extension("%(ext)s").to_string_lossy().into_owned()
}

fn parse_metadata(stdout: &str) -> RawMetadata {
    let mut lines = stdout.lines().map(str::trim);
    let title = lines.next().unwrap_or_default().to_string();
    let duration = lines.next().unwrap_or_default().to_string();
    RawMetadata { title, duration }
}

fn parse_size(stdout: &str) -> Option<u64> {
    let line = stdout.lines().next()?.trim();
    // Approximate sizes can come back as floats.
    line.parse::<u64>()
        .ok()
        .or_else(|| line.parse::<f64>().ok().filter(|v| *v > 0.0).map(|v| v as u64))
        .filter(|v| *v > 0)
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn fetch_metadata(
        &self,
        url: &str,
        profile: &RequestProfile,
        cookies: Option<&str>,
    ) -> Result<RawMetadata, ToolError> {
        let mut cmd = self.base_command(profile, cookies);
        cmd.args(["--skip-download", "--print", "title", "--print", "duration_string"])
            .arg(url);
        let output = run_captured(TOOL, cmd).await?;
        Ok(parse_metadata(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn probe_size(&self, url: &str, profile: &RequestProfile) -> Option<u64> {
        let mut cmd = self.base_command(profile, None);
        cmd.args(["--skip-download", "-f", profile.format.as_str()])
            .args(["--print", "%(filesize,filesize_approx)s"])
            .arg(url);
        match run_captured(TOOL, cmd).await {
            Ok(output) => parse_size(&String::from_utf8_lossy(&output.stdout)),
            Err(e) => {
                tracing::debug!(url, error = %e, "size probe failed");
                None
            }
        }
    }

    async fn fetch_audio(&self, request: &FetchRequest) -> Result<(), ToolError> {
        let mut cmd = self.base_command(&request.profile, request.cookies.as_deref());
        cmd.args(["-f", request.profile.format.as_str(), "-x"])
            .args(["--audio-format", request.audio_format.as_str()])
            .args(["--audio-quality", request.audio_bitrate.as_str()])
            .arg("-o")
            .arg(output_template(&request.output_path));
        if let Some(ffmpeg) = &self.ffmpeg {
            cmd.arg("--ffmpeg-location").arg(ffmpeg);
        }
        cmd.arg(&request.url);
        tracing::debug!(url = %request.url, output = %request.output_path.display(), "starting yt-dlp fetch");
        run_captured(TOOL, cmd).await.map(|_| ())
    }
}
