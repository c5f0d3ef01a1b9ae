//! Repository for the `midterm_reviews` table.

use cipm_core::workflow::ApprovalStatus;
use sqlx::PgPool;

use crate::models::midterm_review::{MidtermReview, SubmitMidtermReview};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "project_name, achievements, next_steps, issues, solutions, \
    review_comments, approval_status, created_at, updated_at";

/// Provides upsert, decision and lookup operations for midterm reviews.
pub struct MidtermReviewRepo;

impl MidtermReviewRepo {
    /// Find the midterm review of a project.
    pub async fn find_by_project(
        pool: &PgPool,
        project_name: &str,
    ) -> Result<Option<MidtermReview>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM midterm_reviews WHERE project_name = $1");
        sqlx::query_as::<_, MidtermReview>(&query)
            .bind(project_name)
            .fetch_optional(pool)
            .await
    }

    /// Create or overwrite the midterm review keyed by project name and set
    /// the project's `midterm_submitted` flag, in one transaction.
    ///
    /// A new row starts `pending`; an existing pending or rejected row has
    /// its text replaced and goes back to `pending`. An approved row is left
    /// untouched and `None` is returned. Concurrent resubmissions are
    /// last-writer-wins.
    pub async fn submit(
        pool: &PgPool,
        project_name: &str,
        input: &SubmitMidtermReview,
    ) -> Result<Option<MidtermReview>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO midterm_reviews
                (project_name, achievements, next_steps, issues, solutions)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (project_name) DO UPDATE SET
                achievements = EXCLUDED.achievements,
                next_steps = EXCLUDED.next_steps,
                issues = EXCLUDED.issues,
                solutions = EXCLUDED.solutions,
                approval_status = 'pending'
             WHERE midterm_reviews.approval_status <> 'approved'
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, MidtermReview>(&query)
            .bind(project_name)
            .bind(&input.achievements)
            .bind(&input.next_steps)
            .bind(&input.issues)
            .bind(&input.solutions)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(review) = review else {
            tx.rollback().await?;
            tracing::debug!(project = %project_name, "Midterm review is approved, upsert skipped");
            return Ok(None);
        };

        sqlx::query("UPDATE projects SET midterm_submitted = true WHERE name = $1")
            .bind(project_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(review))
    }

    /// Overwrite the approval status. Returns `None` if no review exists.
    pub async fn set_approval(
        pool: &PgPool,
        project_name: &str,
        status: ApprovalStatus,
    ) -> Result<Option<MidtermReview>, sqlx::Error> {
        let query = format!(
            "UPDATE midterm_reviews SET approval_status = $2
             WHERE project_name = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MidtermReview>(&query)
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
    ) -> Result<Option<MidtermReview>, sqlx::Error> {
        let query = format!(
            "UPDATE midterm_reviews SET review_comments = $2
             WHERE project_name = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MidtermReview>(&query)
            .bind(project_name)
            .bind(comments)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the reviews belonging to any of the given projects.
    pub async fn list_for_projects(
        pool: &PgPool,
        project_names: &[String],
    ) -> Result<Vec<MidtermReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM midterm_reviews
             WHERE project_name = ANY($1)
             ORDER BY project_name ASC"
        );
        sqlx::query_as::<_, MidtermReview>(&query)
            .bind(project_names)
            .fetch_all(pool)
            .await
    }
}
