pub mod health;
pub mod photos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /photos                list, upload
/// /photos/order          save display order (PUT)
/// /photos/{id}           delete
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().nest("/photos", photos::router(max_upload_bytes))
}
