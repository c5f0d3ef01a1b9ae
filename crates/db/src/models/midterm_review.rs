//! Midterm review model and DTOs.

use cipm_core::error::CoreError;
use cipm_core::types::Timestamp;
use cipm_core::validation::validate_not_blank;
use cipm_core::workflow::ApprovalStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::parse_stored_status;

/// A row from the `midterm_reviews` table (one per project).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MidtermReview {
    pub project_name: String,
    pub achievements: String,
    pub next_steps: String,
    pub issues: String,
    pub solutions: String,
    pub review_comments: String,
    pub approval_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MidtermReview {
    pub fn approval(&self) -> Result<ApprovalStatus, CoreError> {
        parse_stored_status(&self.approval_status)
    }
}

/// DTO for submitting or resubmitting a midterm review. The project comes
/// from the path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitMidtermReview {
    #[validate(custom(function = "validate_not_blank"))]
    pub achievements: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub next_steps: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub issues: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub solutions: String,
}
