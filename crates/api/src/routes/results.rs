//! Route definitions for the `/results` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::results;
use crate::state::AppState;

/// Routes mounted at `/results`.
///
/// ```text
/// GET    /eligible  -> list_eligible
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/eligible", get(results::list_eligible))
}
