use axum::routing::{get, post};
use axum::Router;

use crate::handlers::flyers;
use crate::state::AppState;

/// Mount flyer routes under `/flyers`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(flyers::generate_flyer))
        .route("/{id}/edit", post(flyers::edit_flyer))
        .route("/{id}", get(flyers::get_flyer))
        .route("/project/{project_id}", get(flyers::get_flyer_by_project))
}
