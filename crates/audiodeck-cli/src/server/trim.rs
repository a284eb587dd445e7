//! `POST /api/trim`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use audiodeck_core::trim::TrimRequest;

use super::{ApiError, AppState, SavedClip};

pub(super) async fn trim(
    State(state): State<AppState>,
    payload: Result<Json<TrimRequest>, JsonRejection>,
) -> Result<Json<SavedClip>, ApiError> {
    let Json(req) = payload?;
    let filename = state.trims.trim(&req).await?;
    Ok(Json(SavedClip {
        message: "Audio trimmed successfully",
        filename,
    }))
}
