pub mod flyers;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /flyers/generate              start generation (POST)
/// /flyers/{id}/edit             queue an edit (POST)
/// /flyers/{id}                  poll a flyer (GET)
/// /flyers/project/{project_id}  poll a project's flyer (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/flyers", flyers::router())
}
