//! Handlers for the `/admin` resource: decisions, reviewer comments, the
//! pending queues and user administration.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cipm_core::types::DbId;
use cipm_core::workflow::PendingStage;
use cipm_db::models::final_report::FinalReport;
use cipm_db::models::midterm_review::MidtermReview;
use cipm_db::models::money_report::MoneyReport;
use cipm_db::models::pending::PendingQueue;
use cipm_db::models::project::{Project, ProjectFeedback};
use cipm_db::models::user::{CreateUser, User};

use super::{CommentsRequest, DecisionRequest};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/projects/{name}/decision
pub async fn decide_project(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<DecisionRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let decision = input.parse()?;
    let project = state
        .engine()
        .decide_project(&admin.caller(), &name, decision)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/admin/projects/{name}/feedback
pub async fn set_feedback(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<ProjectFeedback>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .engine()
        .set_project_feedback(&admin.caller(), &name, &input.feedback)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Midterm review
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/projects/{name}/midterm/decision
pub async fn decide_midterm(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<DecisionRequest>,
) -> AppResult<Json<DataResponse<MidtermReview>>> {
    let decision = input.parse()?;
    let review = state
        .engine()
        .decide_midterm(&admin.caller(), &name, decision)
        .await?;
    Ok(Json(DataResponse { data: review }))
}

/// PUT /api/v1/admin/projects/{name}/midterm/comments
pub async fn comment_midterm(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<CommentsRequest>,
) -> AppResult<Json<DataResponse<MidtermReview>>> {
    let review = state
        .engine()
        .comment_midterm(&admin.caller(), &name, &input.comments)
        .await?;
    Ok(Json(DataResponse { data: review }))
}

// ---------------------------------------------------------------------------
// Final report
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/projects/{name}/final-report/decision
pub async fn decide_final_report(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<DecisionRequest>,
) -> AppResult<Json<DataResponse<FinalReport>>> {
    let decision = input.parse()?;
    let report = state
        .engine()
        .decide_final_report(&admin.caller(), &name, decision)
        .await?;
    Ok(Json(DataResponse { data: report }))
}

/// PUT /api/v1/admin/projects/{name}/final-report/comments
pub async fn comment_final_report(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(name): AppPath<String>,
    AppJson(input): AppJson<CommentsRequest>,
) -> AppResult<Json<DataResponse<FinalReport>>> {
    let report = state
        .engine()
        .comment_final_report(&admin.caller(), &name, &input.comments)
        .await?;
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Funding
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/funding/{id}/decision
pub async fn decide_funding(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<DecisionRequest>,
) -> AppResult<Json<DataResponse<MoneyReport>>> {
    let decision = input.parse()?;
    let report = state
        .engine()
        .decide_funding(&admin.caller(), id, decision)
        .await?;
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Queues
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/pending/{stage}
///
/// Stage 0 funding, 1 applications, 2 midterm reviews, 3 final reports.
/// Any other number is a 400.
pub async fn list_pending(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(stage): AppPath<u8>,
) -> AppResult<Json<DataResponse<PendingQueue>>> {
    let stage = PendingStage::try_from(stage)?;
    let queue = state.engine().list_pending(&admin.caller(), stage).await?;
    Ok(Json(DataResponse { data: queue }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let users = state.engine().list_users(&admin.caller()).await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/admin/users
///
/// Provision a user. Returns 201, or 409 if the username is taken.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateUser>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    let user = state.engine().create_user(&admin.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Cascades to the projects the user leads.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    state.engine().delete_user(&admin.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
