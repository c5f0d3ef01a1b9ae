//! Handlers for the `/projects` resource (owner side).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cipm_db::models::project::{ApplyProject, Project};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
///
/// Apply for a new project led by the caller. Returns 201 with the pending
/// project, 409 if the name is taken.
pub async fn apply(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<ApplyProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let project = state.engine().apply_project(&auth.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.engine().list_my_projects(&auth.caller()).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{name}
pub async fn get_by_name(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(name): AppPath<String>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.engine().get_project(&auth.caller(), &name).await?;
    Ok(Json(DataResponse { data: project }))
}
