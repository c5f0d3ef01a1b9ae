//! Handlers for the per-project midterm review and final report, owner side.
//!
//! Both are upserts keyed by the project name in the path: the first `PUT`
//! creates the record, later ones overwrite it until it is approved.

use axum::extract::State;
use axum::Json;
use cipm_db::models::final_report::{FinalReport, SubmitFinalReport};
use cipm_db::models::midterm_review::{MidtermReview, SubmitMidtermReview};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/projects/{name}/midterm
pub async fn submit_midterm(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<SubmitMidtermReview>,
) -> AppResult<Json<DataResponse<MidtermReview>>> {
    let review = state
        .engine()
        .submit_midterm(&auth.caller(), &name, input)
        .await?;
    Ok(Json(DataResponse { data: review }))
}

/// GET /api/v1/projects/{name}/midterm
pub async fn get_midterm(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(name): AppPath<String>,
) -> AppResult<Json<DataResponse<MidtermReview>>> {
    let review = state.engine().get_midterm(&auth.caller(), &name).await?;
    Ok(Json(DataResponse { data: review }))
}

/// PUT /api/v1/projects/{name}/final-report
pub async fn submit_final_report(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<SubmitFinalReport>,
) -> AppResult<Json<DataResponse<FinalReport>>> {
    let report = state
        .engine()
        .submit_final_report(&auth.caller(), &name, input)
        .await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/projects/{name}/final-report
pub async fn get_final_report(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(name): AppPath<String>,
) -> AppResult<Json<DataResponse<FinalReport>>> {
    let report = state.engine().get_final_report(&auth.caller(), &name).await?;
    Ok(Json(DataResponse { data: report }))
}
