//! `POST /api/upload`: multipart field `audio`, streamed to the clips dir.

use std::path::Path;

use anyhow::Context;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use tokio::io::AsyncWriteExt;

use audiodeck_core::config::OUTPUT_SIZE_CAP_BYTES;
use audiodeck_core::expiry::write_expiry_meta;
use audiodeck_core::filename::upload_filename;

use super::{ApiError, AppState, SavedClip};

const UPLOAD_FIELD: &str = "audio";

pub(super) async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SavedClip>, ApiError> {
    let clips_dir = state.pipeline.clips_dir();
    tokio::fs::create_dir_all(clips_dir)
        .await
        .with_context(|| format!("create {}", clips_dir.display()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original = field.file_name().unwrap_or("upload").to_string();
        let filename = upload_filename(&original);
        let path = clips_dir.join(&filename);

        let size = match store_field(field, &path, OUTPUT_SIZE_CAP_BYTES).await {
            Ok(size) => size,
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                tracing::info!(file = %filename, status = %e.status(), "upload rejected");
                return Err(e);
            }
        };
        write_expiry_meta(&path, state.clip_ttl, Some(original)).await;
        tracing::info!(file = %filename, size, "upload stored");
        return Ok(Json(SavedClip {
            message: "File uploaded successfully",
            filename,
        }));
    }

    Err(ApiError::bad_request("No file uploaded"))
}

/// Copy one field to `path`, failing once more than `cap` bytes arrive.
async fn store_field(mut field: Field<'_>, path: &Path, cap: u64) -> Result<u64, ApiError> {
    let mut out = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("create {}", path.display()))?;
    let mut written: u64 = 0;
    while let Some(chunk) = field.chunk().await? {
        written = written.saturating_add(chunk.len() as u64);
        if written > cap {
            return Err(ApiError::payload_too_large(cap));
        }
        out.write_all(&chunk).await.context("write upload")?;
    }
    out.flush().await.context("flush upload")?;
    Ok(written)
}
