//! Route definitions for gallery photos.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::photo;
use crate::state::AppState;

/// Routes mounted at `/photos`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> upload (multipart)
/// PUT    /order   -> reorder
/// DELETE /{id}    -> delete
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(photo::list)
                .post(photo::upload)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/order", put(photo::reorder))
        .route("/{id}", delete(photo::delete))
}
