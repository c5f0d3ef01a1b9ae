//! Repository for the `money_reports` table.

use cipm_core::types::DbId;
use cipm_core::workflow::ApprovalStatus;
use sqlx::PgPool;

use crate::models::money_report::{ApplyFunding, MoneyReport};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_name, applicant_name, requested_amount_cents, purpose, \
    contact_info, application_date, approval_status, created_at, updated_at";

/// Provides append-only creation and per-record decisions for funding requests.
pub struct MoneyReportRepo;

impl MoneyReportRepo {
    /// Insert a new funding request and set the project's
    /// `funding_submitted` flag, in one transaction. Never upserts.
    pub async fn create(pool: &PgPool, input: &ApplyFunding) -> Result<MoneyReport, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE projects SET funding_submitted = true WHERE name = $1")
            .bind(&input.project_name)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO money_reports
                (project_name, applicant_name, requested_amount_cents, purpose, contact_info,
                 application_date)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, CURRENT_DATE))
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, MoneyReport>(&query)
            .bind(&input.project_name)
            .bind(&input.applicant_name)
            .bind(input.requested_amount_cents)
            .bind(&input.purpose)
            .bind(&input.contact_info)
            .bind(input.application_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(report)
    }

    /// Find a funding request by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MoneyReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM money_reports WHERE id = $1");
        sqlx::query_as::<_, MoneyReport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List requests awaiting a decision, oldest first.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<MoneyReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM money_reports
             WHERE approval_status = 'pending'
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, MoneyReport>(&query).fetch_all(pool).await
    }

    /// List all requests for the given projects, oldest first.
    pub async fn list_for_projects(
        pool: &PgPool,
        project_names: &[String],
    ) -> Result<Vec<MoneyReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM money_reports
             WHERE project_name = ANY($1)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, MoneyReport>(&query)
            .bind(project_names)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the approval status of one request. Returns `None` if it
    /// does not exist.
    pub async fn set_approval(
        pool: &PgPool,
        id: DbId,
        status: ApprovalStatus,
    ) -> Result<Option<MoneyReport>, sqlx::Error> {
        let query = format!(
            "UPDATE money_reports SET approval_status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MoneyReport>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
