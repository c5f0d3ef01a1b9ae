//! Handlers for funding requests (owner side).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cipm_core::types::DbId;
use cipm_db::models::money_report::{ApplyFunding, MoneyReport};
use cipm_db::models::pending::ProjectFunding;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/funding
///
/// Every call files a new, independent request.
pub async fn apply(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<ApplyFunding>,
) -> AppResult<(StatusCode, Json<DataResponse<MoneyReport>>)> {
    let report = state.engine().apply_funding(&auth.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/v1/funding/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ProjectFunding>>>> {
    let funding = state.engine().list_my_funding(&auth.caller()).await?;
    Ok(Json(DataResponse { data: funding }))
}

/// GET /api/v1/funding/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<MoneyReport>>> {
    let report = state.engine().get_funding(&auth.caller(), id).await?;
    Ok(Json(DataResponse { data: report }))
}
