use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Hard cap on any produced or uploaded audio file (25 MiB). Not configurable.
pub const OUTPUT_SIZE_CAP_BYTES: u64 = 25 * 1024 * 1024;

/// Global configuration loaded from `~/.config/audiodeck/config.toml`,
/// then overridden by environment variables (see [`DeckConfig::apply_env`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// HTTP listen address for `audiodeck serve`.
    pub listen_addr: String,
    /// Directory holding uploads, fetched audio and trims. `None` = XDG data dir.
    pub clips_dir: Option<PathBuf>,
    /// Longest source accepted for a fetch job, in minutes.
    pub max_duration_minutes: u64,
    /// How many extractor invocations may run at once against one origin.
    pub max_concurrent_per_origin: usize,
    /// Pass browser cookies to the extractor for origins whose profile allows it.
    pub use_browser_cookies: bool,
    /// Browser (and optional profile) to read cookies from, e.g. `firefox` or `chrome:Profile 1`.
    pub browser_cookie_profile: Option<String>,
    pub ytdlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub audio_format: String,
    pub audio_bitrate: String,
    /// Sampler / broadcaster tick in milliseconds.
    pub progress_interval_ms: u64,
    pub metadata_ttl_secs: u64,
    /// Upper bound on a single metadata lookup; a timeout is reported like a bad link.
    pub metadata_timeout_secs: u64,
    /// How long a finished job stays readable by late subscribers.
    pub job_retention_secs: u64,
    /// TTL written to the expiry sidecar of every produced clip.
    pub clip_ttl_secs: u64,
    /// Fallback size estimate when the extractor cannot report one (~128 kbps).
    pub assumed_bitrate_bytes_per_sec: u64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:4000".to_string(),
            clips_dir: None,
            max_duration_minutes: 20,
            max_concurrent_per_origin: 1,
            use_browser_cookies: false,
            browser_cookie_profile: None,
            ytdlp_path: PathBuf::from("yt-dlp"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            audio_format: "mp3".to_string(),
            audio_bitrate: "192K".to_string(),
            progress_interval_ms: 200,
            metadata_ttl_secs: 600,
            metadata_timeout_secs: 60,
            job_retention_secs: 60,
            clip_ttl_secs: 3600,
            assumed_bitrate_bytes_per_sec: 16_000,
        }
    }
}

impl DeckConfig {
    pub fn max_duration_secs(&self) -> u64 {
        self.max_duration_minutes.saturating_mul(60)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }

    pub fn metadata_ttl(&self) -> Duration {
        Duration::from_secs(self.metadata_ttl_secs)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs.max(1))
    }

    /// Retention never drops below one progress tick so the final payload is
    /// still readable by the broadcaster.
    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs).max(self.progress_interval())
    }

    pub fn clip_ttl(&self) -> Duration {
        Duration::from_secs(self.clip_ttl_secs)
    }

    /// Browser cookie source handed to the extractor, if injection is enabled.
    pub fn cookie_source(&self) -> Option<String> {
        if !self.use_browser_cookies {
            return None;
        }
        Some(
            self.browser_cookie_profile
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| "firefox".to_string()),
        )
    }

    /// Resolve the clips directory, defaulting to `~/.local/share/audiodeck/clips`.
    pub fn clips_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.clips_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("audiodeck")?;
        Ok(xdg_dirs.get_data_home().join("clips"))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply environment-style overrides from `lookup`. Unparseable values are
    /// ignored with a warning so a typo never prevents startup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parsed(&lookup, "MAX_DURATION_MINUTES") {
            self.max_duration_minutes = v;
        }
        if let Some(v) = parsed::<usize, _>(&lookup, "MAX_CONCURRENT_DOWNLOADS_PER_ORIGIN") {
            self.max_concurrent_per_origin = v.max(1);
        }
        if let Some(v) = lookup("USE_BROWSER_COOKIES") {
            self.use_browser_cookies = matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(v) = lookup("BROWSER_COOKIE_PROFILE") {
            self.browser_cookie_profile = Some(v);
        }
        if let Some(v) = lookup("CLIPS_DIR") {
            self.clips_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("AUDIODECK_ADDR") {
            self.listen_addr = v;
        }
        if let Some(v) = lookup("YTDLP_PATH") {
            self.ytdlp_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("FFMPEG_PATH") {
            self.ffmpeg_path = PathBuf::from(v);
        }
    }
}

fn parsed<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable override");
            None
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("audiodeck")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// Environment overrides are applied on top.
pub fn load_or_init() -> Result<DeckConfig> {
    let path = config_path()?;
    let mut cfg = if !path.exists() {
        let default_cfg = DeckConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    } else {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data)?
    };
    cfg.apply_env();
    Ok(cfg)
}
