//! Handlers for the `/photos` resource.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use folio_core::gallery::UploadRequest;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Content type recorded when the file part does not declare one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Body of `PUT /photos/order`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Every photo id, in the new display order.
    pub ids: Vec<String>,
}

/// GET /api/v1/photos
///
/// List all photos in display order.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let photos = state.gallery.list().await?;
    Ok(Json(DataResponse { data: photos }))
}

/// POST /api/v1/photos
///
/// Accepts a multipart form with a required `file` field and an optional
/// `original_file_name` field. Bytes go to object storage first, then the
/// record is created.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut file: Option<(Option<String>, String, Vec<u8>)> = None;
    let mut original_file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let data = field.bytes().await?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            "original_file_name" => {
                original_file_name = Some(field.text().await?);
            }
            _ => {} // ignore unknown fields
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let photo = state
        .gallery
        .upload(UploadRequest {
            file_name,
            original_file_name,
            content_type,
            bytes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}

/// DELETE /api/v1/photos/{id}
///
/// Removes the stored object, then the record.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.gallery.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/photos/order
///
/// Save a new display order. The body must list every photo id exactly once;
/// orders are reassigned as 0-based positions. Returns the reordered gallery.
pub async fn reorder(
    State(state): State<AppState>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    let photos = state.gallery.reorder(&input.ids).await?;
    Ok(Json(DataResponse { data: photos }))
}
