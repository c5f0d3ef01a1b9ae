//! Approval state machine and stage gates for the project lifecycle.
//!
//! A project moves through four stage-gated records: the application itself,
//! the midterm review, the final report and (independently) any number of
//! funding requests. Every record carries its own three-valued approval
//! status. The functions here decide which transitions are legal, which
//! records surface in each administrator queue, and which projects may
//! receive a results artifact.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Status and decision values
-------------------------------------------------------------------------- */

/// Approval status shared by projects, midterm reviews, final reports and
/// money reports. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// All valid approval status values.
pub const VALID_APPROVAL_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => STATUS_PENDING,
            ApprovalStatus::Approved => STATUS_APPROVED,
            ApprovalStatus::Rejected => STATUS_REJECTED,
        }
    }

    pub fn is_approved(self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(ApprovalStatus::Pending),
            STATUS_APPROVED => Ok(ApprovalStatus::Approved),
            STATUS_REJECTED => Ok(ApprovalStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid approval status '{other}'. Must be one of: {}",
                VALID_APPROVAL_STATUSES.join(", ")
            ))),
        }
    }
}

/// An administrator decision on a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

pub const DECISION_APPROVE: &str = "approve";
pub const DECISION_REJECT: &str = "reject";

/// All valid decision values.
pub const VALID_DECISIONS: &[&str] = &[DECISION_APPROVE, DECISION_REJECT];

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => DECISION_APPROVE,
            Decision::Reject => DECISION_REJECT,
        }
    }

    /// The status a record ends up in once this decision is applied.
    pub fn target_status(self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            DECISION_APPROVE => Ok(Decision::Approve),
            DECISION_REJECT => Ok(Decision::Reject),
            other => Err(CoreError::Validation(format!(
                "Invalid decision '{other}'. Must be one of: {}",
                VALID_DECISIONS.join(", ")
            ))),
        }
    }
}

/// Planning status chosen by the applicant. Informational only; it does not
/// take part in any gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanningStatus {
    Planning,
    Ongoing,
    Completed,
}

/// All valid planning status values.
pub const VALID_PLANNING_STATUSES: &[&str] = &["planning", "ongoing", "completed"];

impl PlanningStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanningStatus::Planning => "planning",
            PlanningStatus::Ongoing => "ongoing",
            PlanningStatus::Completed => "completed",
        }
    }
}

impl FromStr for PlanningStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(PlanningStatus::Planning),
            "ongoing" => Ok(PlanningStatus::Ongoing),
            "completed" => Ok(PlanningStatus::Completed),
            other => Err(CoreError::Validation(format!(
                "Invalid planning status '{other}'. Must be one of: {}",
                VALID_PLANNING_STATUSES.join(", ")
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Transitions
-------------------------------------------------------------------------- */

/// Apply an administrator decision to a record's current status.
///
/// `pending` moves to the decision's target. Re-applying the decision that
/// produced the current terminal state is a no-op overwrite. Applying the
/// opposite decision to a terminal state is a conflict: approved and rejected
/// never flip or revert.
pub fn apply_decision(
    current: ApprovalStatus,
    decision: Decision,
) -> Result<ApprovalStatus, CoreError> {
    let target = decision.target_status();
    match current {
        ApprovalStatus::Pending => Ok(target),
        terminal if terminal == target => Ok(target),
        terminal => Err(CoreError::Conflict(format!(
            "Cannot {decision} a record that is already {terminal}"
        ))),
    }
}

/// Status a midterm review or final report takes when its owner resubmits it.
///
/// A pending report stays pending (its fields are overwritten). A rejected
/// report goes back to pending, which is the only way out of `rejected`.
/// An approved report is locked.
pub fn resubmission_status(current: ApprovalStatus) -> Result<ApprovalStatus, CoreError> {
    match current {
        ApprovalStatus::Pending | ApprovalStatus::Rejected => Ok(ApprovalStatus::Pending),
        ApprovalStatus::Approved => Err(CoreError::Conflict(
            "An approved report can no longer be resubmitted".to_string(),
        )),
    }
}

/* --------------------------------------------------------------------------
Administrator queues
-------------------------------------------------------------------------- */

/// The four administrator action queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStage {
    /// Stage 0: pending funding requests.
    Funding,
    /// Stage 1: pending project applications.
    Application,
    /// Stage 2: midterm reviews of approved projects.
    Midterm,
    /// Stage 3: final reports of projects whose midterm is approved.
    FinalReport,
}

impl TryFrom<u8> for PendingStage {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PendingStage::Funding),
            1 => Ok(PendingStage::Application),
            2 => Ok(PendingStage::Midterm),
            3 => Ok(PendingStage::FinalReport),
            other => Err(CoreError::Validation(format!(
                "Invalid pending stage {other}. Must be 0, 1, 2 or 3"
            ))),
        }
    }
}

/// Whether a project surfaces in the stage-2 (midterm) queue.
///
/// The project must be approved. A missing midterm review still surfaces
/// (as "not yet submitted"); an existing one only while pending.
pub fn in_midterm_queue(project: ApprovalStatus, midterm: Option<ApprovalStatus>) -> bool {
    project.is_approved() && midterm.map_or(true, |m| m == ApprovalStatus::Pending)
}

/// Whether a project surfaces in the stage-3 (final report) queue.
///
/// The project and its midterm review must both be approved; otherwise the
/// project is skipped regardless of its final report. A missing final report
/// surfaces, an existing one only while pending.
pub fn in_final_report_queue(
    project: ApprovalStatus,
    midterm: Option<ApprovalStatus>,
    final_report: Option<ApprovalStatus>,
) -> bool {
    project.is_approved()
        && midterm.is_some_and(ApprovalStatus::is_approved)
        && final_report.map_or(true, |f| f == ApprovalStatus::Pending)
}

/// Triple-approval predicate for results submission.
pub fn is_eligible_for_results(
    project: ApprovalStatus,
    midterm: Option<ApprovalStatus>,
    final_report: Option<ApprovalStatus>,
) -> bool {
    project.is_approved()
        && midterm.is_some_and(ApprovalStatus::is_approved)
        && final_report.is_some_and(ApprovalStatus::is_approved)
}

/* --------------------------------------------------------------------------
Write-time gates
-------------------------------------------------------------------------- */

/// Gate for submitting or deciding a midterm review: the project must be
/// approved.
pub fn check_midterm_gate(project: ApprovalStatus) -> Result<(), CoreError> {
    if project.is_approved() {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Midterm review requires an approved project (project is {project})"
        )))
    }
}

/// Gate for submitting or deciding a final report: the project and its
/// midterm review must both be approved.
pub fn check_final_report_gate(
    project: ApprovalStatus,
    midterm: Option<ApprovalStatus>,
) -> Result<(), CoreError> {
    check_midterm_gate(project)?;
    match midterm {
        Some(ApprovalStatus::Approved) => Ok(()),
        Some(other) => Err(CoreError::Conflict(format!(
            "Final report requires an approved midterm review (midterm is {other})"
        ))),
        None => Err(CoreError::Conflict(
            "Final report requires an approved midterm review (none submitted)".to_string(),
        )),
    }
}

/// Gate for results submission: the triple-approval predicate must hold.
pub fn check_results_gate(
    project: ApprovalStatus,
    midterm: Option<ApprovalStatus>,
    final_report: Option<ApprovalStatus>,
) -> Result<(), CoreError> {
    if is_eligible_for_results(project, midterm, final_report) {
        Ok(())
    } else {
        Err(CoreError::Conflict(
            "Results can only be submitted once the project, its midterm review and its \
             final report are all approved"
                .to_string(),
        ))
    }
}
