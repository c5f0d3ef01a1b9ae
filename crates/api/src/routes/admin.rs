//! Route definitions for the `/admin` resource.
//!
//! Every handler here extracts `RequireAdmin`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST   /projects/{name}/decision                -> decide_project
/// PUT    /projects/{name}/feedback                -> set_feedback
/// POST   /projects/{name}/midterm/decision        -> decide_midterm
/// PUT    /projects/{name}/midterm/comments        -> comment_midterm
/// POST   /projects/{name}/final-report/decision   -> decide_final_report
/// PUT    /projects/{name}/final-report/comments   -> comment_final_report
/// POST   /funding/{id}/decision                   -> decide_funding
/// GET    /pending/{stage}                         -> list_pending
/// GET    /users                                   -> list_users
/// POST   /users                                   -> create_user
/// DELETE /users/{id}                              -> delete_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects/{name}/decision", post(admin::decide_project))
        .route("/projects/{name}/feedback", put(admin::set_feedback))
        .route(
            "/projects/{name}/midterm/decision",
            post(admin::decide_midterm),
        )
        .route(
            "/projects/{name}/midterm/comments",
            put(admin::comment_midterm),
        )
        .route(
            "/projects/{name}/final-report/decision",
            post(admin::decide_final_report),
        )
        .route(
            "/projects/{name}/final-report/comments",
            put(admin::comment_final_report),
        )
        .route("/funding/{id}/decision", post(admin::decide_funding))
        .route("/pending/{stage}", get(admin::list_pending))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", delete(admin::delete_user))
}
