//! Handlers for project results.

use axum::extract::State;
use axum::Json;
use cipm_db::models::project::{Project, SubmitResults};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/projects/{name}/results
///
/// 409 unless the project, its midterm review and its final report are all
/// approved. Resubmitting replaces the artifact.
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<SubmitResults>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .engine()
        .submit_results(&auth.caller(), &name, input)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// GET /api/v1/results/eligible
pub async fn list_eligible(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state
        .engine()
        .list_eligible_for_results(&auth.caller())
        .await?;
    Ok(Json(DataResponse { data: projects }))
}
