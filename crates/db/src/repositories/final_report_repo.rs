//! Repository for the `final_reports` table.

use cipm_core::workflow::ApprovalStatus;
use sqlx::PgPool;

use crate::models::final_report::{FinalReport, SubmitFinalReport};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "project_name, results_summary, main_content, significance, \
    review_comments, approval_status, created_at, updated_at";

/// Provides upsert, decision and lookup operations for final reports.
pub struct FinalReportRepo;

impl FinalReportRepo {
    /// Find the final report of a project.
    pub async fn find_by_project(
        pool: &PgPool,
        project_name: &str,
    ) -> Result<Option<FinalReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM final_reports WHERE project_name = $1");
        sqlx::query_as::<_, FinalReport>(&query)
            .bind(project_name)
            .fetch_optional(pool)
            .await
    }

    /// Create or overwrite the final report keyed by project name and set the
    /// project's `final_submitted` flag, in one transaction.
    ///
    /// Same overwrite rules as the midterm review: approved reports are
    /// locked (returns `None`), anything else is replaced and reset to
    /// `pending`.
    pub async fn submit(
        pool: &PgPool,
        project_name: &str,
        input: &SubmitFinalReport,
    ) -> Result<Option<FinalReport>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO final_reports
                (project_name, results_summary, main_content, significance)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (project_name) DO UPDATE SET
                results_summary = EXCLUDED.results_summary,
                main_content = EXCLUDED.main_content,
                significance = EXCLUDED.significance,
                approval_status = 'pending'
             WHERE final_reports.approval_status <> 'approved'
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, FinalReport>(&query)
            .bind(project_name)
            .bind(&input.results_summary)
            .bind(&input.main_content)
            .bind(&input.significance)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(report) = report else {
            tx.rollback().await?;
            tracing::debug!(project = %project_name, "Final report is approved, upsert skipped");
            return Ok(None);
        };

        sqlx::query("UPDATE projects SET final_submitted = true WHERE name = $1")
            .bind(project_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(report))
    }

    /// Overwrite the approval status. Returns `None` if no report exists.
    pub async fn set_approval(
        pool: &PgPool,
        project_name: &str,
        status: ApprovalStatus,
    ) -> Result<Option<FinalReport>, sqlx::Error> {
        let query = format!(
            "UPDATE final_reports SET approval_status = $2
             WHERE project_name = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinalReport>(&query)
            .bind(project_name)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the reviewer comments without touching the status.
    pub async fn set_comments(
        pool: &PgPool,
        project_name: &str,
        comments: &str,
    ) -> Result<Option<FinalReport>, sqlx::Error> {
        let query = format!(
            "UPDATE final_reports SET review_comments = $2
             WHERE project_name = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinalReport>(&query)
            .bind(project_name)
            .bind(comments)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the reports belonging to any of the given projects.
    pub async fn list_for_projects(
        pool: &PgPool,
        project_names: &[String],
    ) -> Result<Vec<FinalReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM final_reports
             WHERE project_name = ANY($1)
             ORDER BY project_name ASC"
        );
        sqlx::query_as::<_, FinalReport>(&query)
            .bind(project_names)
            .fetch_all(pool)
            .await
    }
}
