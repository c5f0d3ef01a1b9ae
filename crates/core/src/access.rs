//! Caller identity and the authorization rules of the workflow.
//!
//! Every workflow operation receives the acting [`Caller`] explicitly; there
//! is no ambient "current user". Which rules are enforced at write time is
//! controlled by [`WorkflowPolicy`].

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// The authenticated user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub role: String,
}

impl Caller {
    pub fn new(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Write-time enforcement switches.
///
/// Listing queries always apply the stage gates; these flags decide whether
/// mutations re-check them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Reject midterm/final-report writes and decisions whose prerequisite
    /// stage is not approved.
    pub enforce_stage_gates: bool,
    /// Restrict owner actions (midterm, final report, funding, results) to
    /// the project leader or an administrator.
    pub enforce_ownership: bool,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            enforce_stage_gates: true,
            enforce_ownership: true,
        }
    }
}

impl WorkflowPolicy {
    /// No write-time checks; only the listing queries filter.
    pub fn permissive() -> Self {
        Self {
            enforce_stage_gates: false,
            enforce_ownership: false,
        }
    }
}

/// Ownership rule for owner-only actions on a project.
///
/// The project leader and administrators may act. With ownership
/// enforcement disabled any authenticated caller may act.
pub fn authorize_owner_action(
    caller: &Caller,
    project_leader_id: DbId,
    policy: &WorkflowPolicy,
) -> Result<(), CoreError> {
    if !policy.enforce_ownership || caller.is_admin() || caller.user_id == project_leader_id {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "Only the project leader may perform this action".to_string(),
    ))
}

/// Administrator-only actions (decisions, comments, pending queues).
pub fn require_admin(caller: &Caller) -> Result<(), CoreError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden("Admin role required".to_string()))
    }
}
