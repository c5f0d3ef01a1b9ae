//! Funding request (money report) model and DTOs.

use cipm_core::error::CoreError;
use cipm_core::types::{Date, DbId, Timestamp};
use cipm_core::validation::{validate_funding_cents, validate_not_blank};
use cipm_core::workflow::ApprovalStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::parse_stored_status;

/// A row from the `money_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MoneyReport {
    pub id: DbId,
    pub project_name: String,
    pub applicant_name: String,
    pub requested_amount_cents: i64,
    pub purpose: String,
    pub contact_info: String,
    pub application_date: Date,
    pub approval_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MoneyReport {
    pub fn approval(&self) -> Result<ApprovalStatus, CoreError> {
        parse_stored_status(&self.approval_status)
    }
}

/// DTO for a funding application. Every submission creates a new row.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_requested_amount"))]
pub struct ApplyFunding {
    #[validate(length(min = 1, max = 255))]
    pub project_name: String,
    #[validate(length(min = 1, max = 100))]
    pub applicant_name: String,
    pub requested_amount_cents: i64,
    #[validate(custom(function = "validate_not_blank"))]
    pub purpose: String,
    #[validate(length(min = 1, max = 100))]
    pub contact_info: String,
    /// Defaults to the current date when omitted.
    pub application_date: Option<Date>,
}

fn validate_requested_amount(input: &ApplyFunding) -> Result<(), ValidationError> {
    validate_funding_cents(input.requested_amount_cents)
}
