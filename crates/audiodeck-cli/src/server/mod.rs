//! HTTP surface for `audiodeck serve`.
//!
//! Handlers are thin: they parse the request, call into `audiodeck-core`
//! and map domain errors through [`ApiError`]. All shared state lives in
//! [`AppState`], built once at startup.

mod error;
mod progress;
mod trim;
mod upload;
mod youtube;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;

use audiodeck_core::config::DeckConfig;
use audiodeck_core::pipeline::Pipeline;
use audiodeck_core::tools::{AudioTrimmer, Ffmpeg, MediaExtractor, YtDlp};
use audiodeck_core::trim::TrimExecutor;

pub use error::ApiError;

/// Owned services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub trims: TrimExecutor,
    pub clip_ttl: Duration,
}

impl AppState {
    /// Services backed by the real `yt-dlp` and `ffmpeg` binaries.
    pub fn from_config(cfg: &DeckConfig) -> Result<Self> {
        let clips_dir = cfg.clips_dir().context("resolve clips directory")?;
        let extractor: Arc<dyn MediaExtractor> =
            Arc::new(YtDlp::new(&cfg.ytdlp_path).with_ffmpeg(&cfg.ffmpeg_path));
        let trimmer: Arc<dyn AudioTrimmer> = Arc::new(Ffmpeg::new(&cfg.ffmpeg_path));
        Ok(Self::new(cfg, clips_dir, extractor, trimmer))
    }

    pub fn new(
        cfg: &DeckConfig,
        clips_dir: PathBuf,
        extractor: Arc<dyn MediaExtractor>,
        trimmer: Arc<dyn AudioTrimmer>,
    ) -> Self {
        Self {
            pipeline: Pipeline::new(cfg, clips_dir.clone(), extractor),
            trims: TrimExecutor::new(clips_dir, trimmer, cfg.clip_ttl()),
            clip_ttl: cfg.clip_ttl(),
        }
    }
}

/// Body of a successful trim or upload.
#[derive(Debug, Serialize)]
struct SavedClip {
    message: &'static str,
    filename: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/youtube", post(youtube::submit))
        .route("/api/youtube/duration", get(youtube::duration))
        .route("/api/youtube/title", get(youtube::title))
        .route("/api/youtube/progress/:id", get(progress::sse))
        .route("/ws", get(progress::ws))
        .route("/api/trim", post(trim::trim))
        // Upload size is enforced while streaming, with a 413 of our own.
        .route(
            "/api/upload",
            post(upload::upload).layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, clips_dir = %state.pipeline.clips_dir().display(), "audiodeck listening");
    println!("Listening on http://{local}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
