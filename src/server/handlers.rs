use axum::{
    extract::{Path, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::artifacts::ArtifactKind;
use crate::coordinates::{resolve_target, PRESET_PLACES};
use crate::error::PipelineError;
use crate::server::api::*;
use crate::server::state::AppState;

pub async fn describe(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DescribeRequest>,
) -> Result<Json<ApiResponse<DescribeResponse>>, AppError> {
    // Validate before queueing behind a running request
    let coords = resolve_target(
        request.ra.as_deref(),
        request.dec.as_deref(),
        request.place.as_deref(),
    )?;

    let guard = state.run_lock().lock_owned().await;
    let pipeline = state.pipeline();

    let result = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        pipeline.process_coordinates(coords)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Pipeline task failed: {}", e)))??;

    let response = DescribeResponse {
        coordinates: result.coordinates,
        description: result.description,
        objects: result.objects,
        // Timestamp keeps browsers from showing the previous run's image
        annotated_image_url: format!(
            "/api/artifacts/annotated?t={}",
            result.generated_at.timestamp_millis()
        ),
        generated_at: result.generated_at,
    };

    Ok(Json(ApiResponse::success(response)))
}

pub async fn list_places() -> Json<ApiResponse<Vec<PlaceResponse>>> {
    let places = PRESET_PLACES
        .iter()
        .map(|place| PlaceResponse {
            name: place.name.to_string(),
            ra: place.ra,
            dec: place.dec,
        })
        .collect();

    Json(ApiResponse::success(places))
}

pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let kind = ArtifactKind::parse(&kind).ok_or(AppError::NotFound)?;
    let store = state.artifacts();

    if !store.exists(kind) {
        return Err(AppError::NotFound);
    }

    let path = store.path(kind);
    let buffer = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::InternalError("Failed to read artifact".to_string()))?;

    if let Ok(age) = store.age_secs(kind) {
        tracing::debug!("Serving {} ({}s old)", path.display(), age);
    }

    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, "no-cache")],
        buffer,
    ))
}

#[derive(Debug)]
pub enum AppError {
    NotFound,
    BadRequest(String),
    /// A remote collaborator (imaging, catalog, detector, chat) failed.
    UpstreamError(String),
    InternalError(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(_) => AppError::BadRequest(err.to_string()),
            PipelineError::Io(_) => AppError::InternalError(err.to_string()),
            _ => AppError::UpstreamError(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UpstreamError(msg) => {
                tracing::warn!("Pipeline failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
