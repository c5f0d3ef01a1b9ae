//! Repository for the `projects` table.

use cipm_core::types::DbId;
use cipm_core::workflow::ApprovalStatus;
use sqlx::PgPool;

use crate::models::project::{ApplyProject, Project};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "name, leader_id, applicant_name, description, design, planning_status, \
    approval_status, start_date, end_date, results, feedback, midterm_submitted, \
    final_submitted, funding_submitted, created_at, updated_at";

/// Same columns qualified with the `p` alias for joins.
const P_COLUMNS: &str = "p.name, p.leader_id, p.applicant_name, p.description, p.design, \
    p.planning_status, p.approval_status, p.start_date, p.end_date, p.results, p.feedback, \
    p.midterm_submitted, p.final_submitted, p.funding_submitted, p.created_at, p.updated_at";

/// Provides CRUD and workflow queries for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new application led by `leader_id`. Approval starts at
    /// `pending` via the column default.
    pub async fn create(
        pool: &PgPool,
        leader_id: DbId,
        input: &ApplyProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, leader_id, applicant_name, description, design, planning_status,
                 start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(leader_id)
            .bind(&input.applicant_name)
            .bind(&input.description)
            .bind(&input.design)
            .bind(&input.planning_status)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE name = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List projects led by a user, latest start date first.
    pub async fn list_by_leader(
        pool: &PgPool,
        leader_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE leader_id = $1
             ORDER BY start_date DESC, name ASC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(leader_id)
            .fetch_all(pool)
            .await
    }

    /// List projects in the given approval status, oldest application first.
    pub async fn list_by_approval(
        pool: &PgPool,
        status: ApprovalStatus,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE approval_status = $1
             ORDER BY created_at ASC, name ASC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    /// Overwrite the approval status. Returns `None` if the project does not exist.
    pub async fn set_approval(
        pool: &PgPool,
        name: &str,
        status: ApprovalStatus,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET approval_status = $2
             WHERE name = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(name)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the administrator feedback. Returns `None` if the project does not exist.
    pub async fn set_feedback(
        pool: &PgPool,
        name: &str,
        feedback: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET feedback = $2
             WHERE name = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(name)
            .bind(feedback)
            .fetch_optional(pool)
            .await
    }

    /// Attach (or replace) the results artifact reference. Does not touch any
    /// status column.
    pub async fn set_results(
        pool: &PgPool,
        name: &str,
        artifact: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET results = $2
             WHERE name = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(name)
            .bind(artifact)
            .fetch_optional(pool)
            .await
    }

    /// Projects whose application, midterm review and final report are all
    /// approved. Evaluated fresh on every call.
    pub async fn list_eligible_for_results(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS}
             FROM projects p
             JOIN midterm_reviews m ON m.project_name = p.name
             JOIN final_reports f ON f.project_name = p.name
             WHERE p.approval_status = 'approved'
               AND m.approval_status = 'approved'
               AND f.approval_status = 'approved'
             ORDER BY p.name ASC"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }
}
