//! Route definitions for the `/funding` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::funding;
use crate::state::AppState;

/// Routes mounted at `/funding`.
///
/// ```text
/// POST   /          -> apply
/// GET    /mine      -> list_mine
/// GET    /{id}      -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(funding::apply))
        .route("/mine", get(funding::list_mine))
        .route("/{id}", get(funding::get_by_id))
}
