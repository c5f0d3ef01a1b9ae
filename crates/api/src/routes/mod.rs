pub mod admin;
pub mod funding;
pub mod health;
pub mod projects;
pub mod results;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                        apply (POST)
/// /projects/mine                                   caller's projects
/// /projects/{name}                                 get
/// /projects/{name}/midterm                         submit (PUT), get
/// /projects/{name}/final-report                    submit (PUT), get
/// /projects/{name}/results                         submit (PUT)
///
/// /funding                                         apply (POST)
/// /funding/mine                                    caller's requests by project
/// /funding/{id}                                    get
///
/// /results/eligible                                triple-approved projects
///
/// /admin/projects/{name}/decision                  approve / reject (POST)
/// /admin/projects/{name}/feedback                  feedback (PUT)
/// /admin/projects/{name}/midterm/decision          approve / reject (POST)
/// /admin/projects/{name}/midterm/comments          comments (PUT)
/// /admin/projects/{name}/final-report/decision     approve / reject (POST)
/// /admin/projects/{name}/final-report/comments     comments (PUT)
/// /admin/funding/{id}/decision                     approve / reject (POST)
/// /admin/pending/{stage}                           queue for stage 0..=3
/// /admin/users                                     list, provision (POST)
/// /admin/users/{id}                                delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", projects::router())
        .nest("/funding", funding::router())
        .nest("/results", results::router())
        .nest("/admin", admin::router())
}
