//! Route definitions for the `/projects` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{projects, results, reviews};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// POST   /                        -> apply
/// GET    /mine                    -> list_mine
/// GET    /{name}                  -> get_by_name
/// PUT    /{name}/midterm          -> submit_midterm
/// GET    /{name}/midterm          -> get_midterm
/// PUT    /{name}/final-report     -> submit_final_report
/// GET    /{name}/final-report     -> get_final_report
/// PUT    /{name}/results          -> results::submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(projects::apply))
        .route("/mine", get(projects::list_mine))
        .route("/{name}", get(projects::get_by_name))
        .route(
            "/{name}/midterm",
            get(reviews::get_midterm).put(reviews::submit_midterm),
        )
        .route(
            "/{name}/final-report",
            get(reviews::get_final_report).put(reviews::submit_final_report),
        )
        .route("/{name}/results", put(results::submit))
}
