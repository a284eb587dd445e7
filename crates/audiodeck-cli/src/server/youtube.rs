//! `/api/youtube*`: submission and link pre-checks.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use audiodeck_core::pipeline::{DurationCheck, SubmitRequest, Submission};

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct UrlQuery {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TitleResponse {
    title: String,
}

pub(super) async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<Submission>, ApiError> {
    let Json(req) = payload?;
    let submission = state.pipeline.submit(req).await?;
    Ok(Json(submission))
}

pub(super) async fn duration(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<DurationCheck>, ApiError> {
    Ok(Json(state.pipeline.check_duration(&query.url).await?))
}

pub(super) async fn title(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<TitleResponse>, ApiError> {
    let title = state.pipeline.title(&query.url).await?;
    Ok(Json(TitleResponse { title }))
}
