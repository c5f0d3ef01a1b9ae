//! Field validators shared by the submission DTOs.
//!
//! These plug into `#[validate(custom(...))]` / `#[validate(schema(...))]`
//! attributes so failures come back as field-level messages.

use std::borrow::Cow;

use validator::ValidationError;

use crate::roles::{ROLE_ADMIN, ROLE_USER};
use crate::types::Date;
use crate::workflow::{PlanningStatus, VALID_PLANNING_STATUSES};

/// Path segments under `/projects` that a project name would shadow.
pub const RESERVED_PROJECT_NAMES: &[&str] = &["mine"];

/// Upper bound (exclusive) for requested funding in cents: DECIMAL(10,2).
pub const MAX_FUNDING_CENTS: i64 = 10_000_000_000;

fn error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

/// The value must not be empty after trimming whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "This field is required".to_string()));
    }
    Ok(())
}

/// A project name doubles as a URL path segment: it must not be blank,
/// contain `/`, or collide with a fixed route such as `/projects/mine`.
pub fn validate_project_name(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value)?;
    if value.contains('/') {
        return Err(error(
            "project_name",
            "Project name must not contain '/'".to_string(),
        ));
    }
    if RESERVED_PROJECT_NAMES.contains(&value.trim()) {
        return Err(error(
            "project_name",
            format!("Project name '{value}' is reserved"),
        ));
    }
    Ok(())
}

/// The value must be a known role name.
pub fn validate_role(value: &str) -> Result<(), ValidationError> {
    if value == ROLE_ADMIN || value == ROLE_USER {
        return Ok(());
    }
    Err(error(
        "role",
        format!("Invalid role '{value}'. Must be one of: {ROLE_ADMIN}, {ROLE_USER}"),
    ))
}

/// The value must be one of the planning statuses.
pub fn validate_planning_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<PlanningStatus>().map(|_| ()).map_err(|_| {
        error(
            "planning_status",
            format!(
                "Invalid planning status '{value}'. Must be one of: {}",
                VALID_PLANNING_STATUSES.join(", ")
            ),
        )
    })
}

/// Requested funding must be positive and fit in DECIMAL(10,2).
pub fn validate_funding_cents(cents: i64) -> Result<(), ValidationError> {
    if cents <= 0 {
        return Err(error(
            "funding_amount",
            "Requested funding must be greater than zero".to_string(),
        ));
    }
    if cents >= MAX_FUNDING_CENTS {
        return Err(error(
            "funding_amount",
            format!("Requested funding must be below {} cents", MAX_FUNDING_CENTS),
        ));
    }
    Ok(())
}

/// A project may not end before it starts.
pub fn validate_date_range(start: Date, end: Date) -> Result<(), ValidationError> {
    if end < start {
        return Err(error(
            "date_range",
            format!("End date {end} precedes start date {start}"),
        ));
    }
    Ok(())
}
