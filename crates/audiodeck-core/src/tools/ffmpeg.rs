//! `ffmpeg` process adapter for trims.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_captured;
use super::{AudioTrimmer, ToolError, TrimSpec};

const TOOL: &str = "ffmpeg";

#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
}

impl Ffmpeg {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Stream-copy `duration` seconds from `start`, timestamps normalised to zero.
fn trim_args(spec: &TrimSpec) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{:.6}", spec.start_seconds),
        "-i".to_string(),
        spec.input.to_string_lossy().into_owned(),
        "-t".to_string(),
        format!("{:.6}", spec.duration_seconds),
        "-avoid_negative_ts".to_string(),
        "make_zero".to_string(),
        "-c".to_string(),
        "copy".to_string(),
        spec.output.to_string_lossy().into_owned(),
    ]
}

#[async_trait]
impl AudioTrimmer for Ffmpeg {
    async fn trim(&self, spec: &TrimSpec) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(trim_args(spec));
        run_captured(TOOL, cmd).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_args_use_six_decimals_and_stream_copy() {
        let spec = TrimSpec {
            input: PathBuf::from("/clips/in.mp3"),
            start_seconds: 1.5,
            duration_seconds: 2.25,
            output: PathBuf::from("/clips/out.mp3"),
        };
        let args = trim_args(&spec);
        let joined = args.join(" ");
        assert!(joined.contains("-ss 1.500000 -i /clips/in.mp3 -t 2.250000"));
        assert!(joined.contains("-avoid_negative_ts make_zero -c copy"));
        assert_eq!(args.last().map(String::as_str), Some("/clips/out.mp3"));
    }
}
