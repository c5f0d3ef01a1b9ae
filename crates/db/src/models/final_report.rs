//! Final report model and DTOs.

use cipm_core::error::CoreError;
use cipm_core::types::Timestamp;
use cipm_core::validation::validate_not_blank;
use cipm_core::workflow::ApprovalStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::parse_stored_status;

/// A row from the `final_reports` table (one per project).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinalReport {
    pub project_name: String,
    pub results_summary: String,
    pub main_content: String,
    /// Ideological-education significance of the project.
    pub significance: String,
    pub review_comments: String,
    pub approval_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FinalReport {
    pub fn approval(&self) -> Result<ApprovalStatus, CoreError> {
        parse_stored_status(&self.approval_status)
    }
}

/// DTO for submitting or resubmitting a final report.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitFinalReport {
    #[validate(custom(function = "validate_not_blank"))]
    pub results_summary: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub main_content: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub significance: String,
}
