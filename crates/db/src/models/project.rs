//! Project entity model and DTOs.

use cipm_core::error::CoreError;
use cipm_core::types::{Date, DbId, Timestamp};
use cipm_core::validation::{
    validate_date_range, validate_not_blank, validate_planning_status, validate_project_name,
};
use cipm_core::workflow::ApprovalStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::parse_stored_status;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub name: String,
    pub leader_id: DbId,
    pub applicant_name: String,
    pub description: String,
    pub design: Option<String>,
    pub planning_status: String,
    pub approval_status: String,
    pub start_date: Date,
    pub end_date: Date,
    /// Reference to the submitted results artifact, if any.
    pub results: Option<String>,
    pub feedback: Option<String>,
    pub midterm_submitted: bool,
    pub final_submitted: bool,
    pub funding_submitted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn approval(&self) -> Result<ApprovalStatus, CoreError> {
        parse_stored_status(&self.approval_status)
    }
}

/// DTO for a project application. The leader is the calling user, never
/// taken from the body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_application_dates"))]
pub struct ApplyProject {
    #[validate(length(min = 1, max = 255), custom(function = "validate_project_name"))]
    pub name: String,
    #[validate(length(min = 1, max = 10))]
    pub applicant_name: String,
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub description: String,
    #[validate(length(max = 255))]
    pub design: Option<String>,
    #[validate(custom(function = "validate_planning_status"))]
    pub planning_status: String,
    pub start_date: Date,
    pub end_date: Date,
}

fn validate_application_dates(input: &ApplyProject) -> Result<(), ValidationError> {
    validate_date_range(input.start_date, input.end_date)
}

/// Administrator feedback on a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFeedback {
    pub feedback: String,
}

/// DTO for attaching a results artifact to an eligible project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitResults {
    #[validate(length(min = 1, max = 1024), custom(function = "validate_not_blank"))]
    pub artifact: String,
}
