//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` submission DTO
//!
//! Approval statuses are stored as TEXT; `approval()` accessors parse them
//! into [`cipm_core::workflow::ApprovalStatus`].

pub mod final_report;
pub mod midterm_review;
pub mod money_report;
pub mod pending;
pub mod project;
pub mod user;

use cipm_core::error::CoreError;
use cipm_core::workflow::ApprovalStatus;

/// Parse a stored approval status. The CHECK constraints make failure an
/// internal error rather than bad input.
pub(crate) fn parse_stored_status(raw: &str) -> Result<ApprovalStatus, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::Internal(format!("Unexpected stored approval status '{raw}'")))
}
