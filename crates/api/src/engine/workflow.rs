//! The four-entity approval workflow: project application, midterm review,
//! final report and funding requests, plus results submission and the
//! administrator queues.
//!
//! Every operation receives the acting [`Caller`] explicitly. Decisions read
//! the current status, compute the next one with [`apply_decision`] and write
//! it back; that compare step is not atomic with the write, so two
//! administrators deciding the same record concurrently resolve as
//! last-writer-wins.

use std::collections::HashMap;

use cipm_core::access::{authorize_owner_action, require_admin, Caller, WorkflowPolicy};
use cipm_core::error::CoreError;
use cipm_core::types::DbId;
use cipm_core::workflow::{
    apply_decision, check_final_report_gate, check_midterm_gate, check_results_gate,
    in_final_report_queue, in_midterm_queue, resubmission_status, ApprovalStatus, Decision,
    PendingStage,
};
use cipm_db::models::final_report::{FinalReport, SubmitFinalReport};
use cipm_db::models::midterm_review::{MidtermReview, SubmitMidtermReview};
use cipm_db::models::money_report::{ApplyFunding, MoneyReport};
use cipm_db::models::pending::{
    FinalReportQueueItem, MidtermQueueItem, PendingQueue, ProjectFunding,
};
use cipm_db::models::project::{ApplyProject, Project, SubmitResults};
use cipm_db::models::user::{CreateUser, User};
use cipm_db::repositories::{
    FinalReportRepo, MidtermReviewRepo, MoneyReportRepo, ProjectRepo, UserRepo,
};
use cipm_db::DbPool;
use validator::Validate;

use crate::error::AppResult;

/// Entry point for every workflow operation.
///
/// Cheap to construct per request via [`crate::state::AppState::engine`].
pub struct WorkflowEngine {
    pool: DbPool,
    policy: WorkflowPolicy,
}

impl WorkflowEngine {
    pub fn new(pool: DbPool, policy: WorkflowPolicy) -> Self {
        Self { pool, policy }
    }

    /* ----------------------------------------------------------------------
    Projects
    ---------------------------------------------------------------------- */

    /// Create a project application led by the caller. Starts `pending`.
    pub async fn apply_project(&self, caller: &Caller, input: ApplyProject) -> AppResult<Project> {
        input.validate()?;

        UserRepo::find_by_id(&self.pool, caller.user_id)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("Unknown user".to_string()))?;

        if ProjectRepo::find_by_name(&self.pool, &input.name)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "A project named '{}' already exists",
                input.name
            ))
            .into());
        }

        let project = ProjectRepo::create(&self.pool, caller.user_id, &input).await?;
        tracing::info!(
            user_id = caller.user_id,
            project = %project.name,
            "Project application submitted",
        );
        Ok(project)
    }

    /// Approve or reject a project application.
    pub async fn decide_project(
        &self,
        caller: &Caller,
        name: &str,
        decision: Decision,
    ) -> AppResult<Project> {
        require_admin(caller)?;
        let project = self.load_project(name).await?;
        let next = apply_decision(project.approval()?, decision)?;

        let project = ProjectRepo::set_approval(&self.pool, name, next)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", name))?;
        tracing::info!(
            user_id = caller.user_id,
            project = %name,
            decision = %decision,
            status = %next,
            "Project decided",
        );
        Ok(project)
    }

    /// Overwrite the administrator feedback on a project.
    pub async fn set_project_feedback(
        &self,
        caller: &Caller,
        name: &str,
        feedback: &str,
    ) -> AppResult<Project> {
        require_admin(caller)?;
        let project = ProjectRepo::set_feedback(&self.pool, name, feedback)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", name))?;
        tracing::info!(user_id = caller.user_id, project = %name, "Project feedback updated");
        Ok(project)
    }

    pub async fn get_project(&self, _caller: &Caller, name: &str) -> AppResult<Project> {
        self.load_project(name).await
    }

    /// Projects led by the caller.
    pub async fn list_my_projects(&self, caller: &Caller) -> AppResult<Vec<Project>> {
        Ok(ProjectRepo::list_by_leader(&self.pool, caller.user_id).await?)
    }

    /* ----------------------------------------------------------------------
    Midterm review
    ---------------------------------------------------------------------- */

    /// Create or resubmit the midterm review of a project.
    ///
    /// Overwrites a pending review, moves a rejected one back to `pending`
    /// and refuses an approved one.
    pub async fn submit_midterm(
        &self,
        caller: &Caller,
        project_name: &str,
        input: SubmitMidtermReview,
    ) -> AppResult<MidtermReview> {
        input.validate()?;
        let project = self.load_project(project_name).await?;
        authorize_owner_action(caller, project.leader_id, &self.policy)?;

        if self.policy.enforce_stage_gates {
            check_midterm_gate(project.approval()?)?;
        }
        if let Some(existing) =
            MidtermReviewRepo::find_by_project(&self.pool, project_name).await?
        {
            resubmission_status(existing.approval()?)?;
        }

        let review = MidtermReviewRepo::submit(&self.pool, project_name, &input)
            .await?
            .ok_or_else(locked_report)?;
        tracing::info!(
            user_id = caller.user_id,
            project = %project_name,
            "Midterm review submitted",
        );
        Ok(review)
    }

    pub async fn get_midterm(
        &self,
        _caller: &Caller,
        project_name: &str,
    ) -> AppResult<MidtermReview> {
        self.load_project(project_name).await?;
        Ok(MidtermReviewRepo::find_by_project(&self.pool, project_name)
            .await?
            .ok_or_else(|| CoreError::not_found("Midterm review", project_name))?)
    }

    /// Approve or reject a project's midterm review.
    pub async fn decide_midterm(
        &self,
        caller: &Caller,
        project_name: &str,
        decision: Decision,
    ) -> AppResult<MidtermReview> {
        require_admin(caller)?;
        let project = self.load_project(project_name).await?;
        if self.policy.enforce_stage_gates {
            check_midterm_gate(project.approval()?)?;
        }

        let review = MidtermReviewRepo::find_by_project(&self.pool, project_name)
            .await?
            .ok_or_else(|| CoreError::not_found("Midterm review", project_name))?;
        let next = apply_decision(review.approval()?, decision)?;

        let review = MidtermReviewRepo::set_approval(&self.pool, project_name, next)
            .await?
            .ok_or_else(|| CoreError::not_found("Midterm review", project_name))?;
        tracing::info!(
            user_id = caller.user_id,
            project = %project_name,
            decision = %decision,
            status = %next,
            "Midterm review decided",
        );
        Ok(review)
    }

    /// Overwrite the reviewer comments on a midterm review.
    pub async fn comment_midterm(
        &self,
        caller: &Caller,
        project_name: &str,
        comments: &str,
    ) -> AppResult<MidtermReview> {
        require_admin(caller)?;
        let review = MidtermReviewRepo::set_comments(&self.pool, project_name, comments)
            .await?
            .ok_or_else(|| CoreError::not_found("Midterm review", project_name))?;
        tracing::info!(
            user_id = caller.user_id,
            project = %project_name,
            "Midterm comments updated",
        );
        Ok(review)
    }

    /* ----------------------------------------------------------------------
    Final report
    ---------------------------------------------------------------------- */

    /// Create or resubmit the final report of a project. Same overwrite rules
    /// as [`Self::submit_midterm`].
    pub async fn submit_final_report(
        &self,
        caller: &Caller,
        project_name: &str,
        input: SubmitFinalReport,
    ) -> AppResult<FinalReport> {
        input.validate()?;
        let project = self.load_project(project_name).await?;
        authorize_owner_action(caller, project.leader_id, &self.policy)?;

        if self.policy.enforce_stage_gates {
            let midterm = self.midterm_status(project_name).await?;
            check_final_report_gate(project.approval()?, midterm)?;
        }
        if let Some(existing) = FinalReportRepo::find_by_project(&self.pool, project_name).await? {
            resubmission_status(existing.approval()?)?;
        }

        let report = FinalReportRepo::submit(&self.pool, project_name, &input)
            .await?
            .ok_or_else(locked_report)?;
        tracing::info!(
            user_id = caller.user_id,
            project = %project_name,
            "Final report submitted",
        );
        Ok(report)
    }

    pub async fn get_final_report(
        &self,
        _caller: &Caller,
        project_name: &str,
    ) -> AppResult<FinalReport> {
        self.load_project(project_name).await?;
        Ok(FinalReportRepo::find_by_project(&self.pool, project_name)
            .await?
            .ok_or_else(|| CoreError::not_found("Final report", project_name))?)
    }

    /// Approve or reject a project's final report.
    pub async fn decide_final_report(
        &self,
        caller: &Caller,
        project_name: &str,
        decision: Decision,
    ) -> AppResult<FinalReport> {
        require_admin(caller)?;
        let project = self.load_project(project_name).await?;
        if self.policy.enforce_stage_gates {
            let midterm = self.midterm_status(project_name).await?;
            check_final_report_gate(project.approval()?, midterm)?;
        }

        let report = FinalReportRepo::find_by_project(&self.pool, project_name)
            .await?
            .ok_or_else(|| CoreError::not_found("Final report", project_name))?;
        let next = apply_decision(report.approval()?, decision)?;

        let report = FinalReportRepo::set_approval(&self.pool, project_name, next)
            .await?
            .ok_or_else(|| CoreError::not_found("Final report", project_name))?;
        tracing::info!(
            user_id = caller.user_id,
            project = %project_name,
            decision = %decision,
            status = %next,
            "Final report decided",
        );
        Ok(report)
    }

    /// Overwrite the reviewer comments on a final report.
    pub async fn comment_final_report(
        &self,
        caller: &Caller,
        project_name: &str,
        comments: &str,
    ) -> AppResult<FinalReport> {
        require_admin(caller)?;
        let report = FinalReportRepo::set_comments(&self.pool, project_name, comments)
            .await?
            .ok_or_else(|| CoreError::not_found("Final report", project_name))?;
        tracing::info!(
            user_id = caller.user_id,
            project = %project_name,
            "Final report comments updated",
        );
        Ok(report)
    }

    /* ----------------------------------------------------------------------
    Funding
    ---------------------------------------------------------------------- */

    /// File a new funding request. Each call creates an independent record.
    pub async fn apply_funding(
        &self,
        caller: &Caller,
        input: ApplyFunding,
    ) -> AppResult<MoneyReport> {
        input.validate()?;
        let project = self.load_project(&input.project_name).await?;
        authorize_owner_action(caller, project.leader_id, &self.policy)?;

        let report = MoneyReportRepo::create(&self.pool, &input).await?;
        tracing::info!(
            user_id = caller.user_id,
            project = %report.project_name,
            money_report_id = report.id,
            amount_cents = report.requested_amount_cents,
            "Funding request submitted",
        );
        Ok(report)
    }

    /// The caller's projects, each with its funding requests.
    pub async fn list_my_funding(&self, caller: &Caller) -> AppResult<Vec<ProjectFunding>> {
        let projects = ProjectRepo::list_by_leader(&self.pool, caller.user_id).await?;
        let names: Vec<String> = projects.iter().map(|p| p.name.clone()).collect();

        let mut by_project: HashMap<String, Vec<MoneyReport>> = HashMap::new();
        for report in MoneyReportRepo::list_for_projects(&self.pool, &names).await? {
            by_project
                .entry(report.project_name.clone())
                .or_default()
                .push(report);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let reports = by_project.remove(&project.name).unwrap_or_default();
                ProjectFunding { project, reports }
            })
            .collect())
    }

    /// A single funding request, visible to the project leader and
    /// administrators.
    pub async fn get_funding(&self, caller: &Caller, id: DbId) -> AppResult<MoneyReport> {
        let report = self.load_money_report(id).await?;
        let project = self.load_project(&report.project_name).await?;
        authorize_owner_action(caller, project.leader_id, &self.policy)?;
        Ok(report)
    }

    /// Approve or reject one funding request. Other requests of the same
    /// project are unaffected.
    pub async fn decide_funding(
        &self,
        caller: &Caller,
        id: DbId,
        decision: Decision,
    ) -> AppResult<MoneyReport> {
        require_admin(caller)?;
        let report = self.load_money_report(id).await?;
        let next = apply_decision(report.approval()?, decision)?;

        let report = MoneyReportRepo::set_approval(&self.pool, id, next)
            .await?
            .ok_or_else(|| CoreError::not_found("Money report", id))?;
        tracing::info!(
            user_id = caller.user_id,
            money_report_id = id,
            decision = %decision,
            status = %next,
            "Funding request decided",
        );
        Ok(report)
    }

    /* ----------------------------------------------------------------------
    Results
    ---------------------------------------------------------------------- */

    /// Attach the results artifact to a fully approved project. Resubmitting
    /// replaces the previous artifact.
    pub async fn submit_results(
        &self,
        caller: &Caller,
        project_name: &str,
        input: SubmitResults,
    ) -> AppResult<Project> {
        input.validate()?;
        let project = self.load_project(project_name).await?;
        authorize_owner_action(caller, project.leader_id, &self.policy)?;

        let midterm = self.midterm_status(project_name).await?;
        let final_report = FinalReportRepo::find_by_project(&self.pool, project_name)
            .await?
            .map(|f| f.approval())
            .transpose()?;
        check_results_gate(project.approval()?, midterm, final_report)?;

        let project = ProjectRepo::set_results(&self.pool, project_name, &input.artifact)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", project_name))?;
        tracing::info!(user_id = caller.user_id, project = %project_name, "Results submitted");
        Ok(project)
    }

    /// Projects whose application, midterm review and final report are all
    /// approved.
    pub async fn list_eligible_for_results(&self, _caller: &Caller) -> AppResult<Vec<Project>> {
        Ok(ProjectRepo::list_eligible_for_results(&self.pool).await?)
    }

    /* ----------------------------------------------------------------------
    Administrator queues
    ---------------------------------------------------------------------- */

    /// Items awaiting administrator action at the given stage.
    pub async fn list_pending(
        &self,
        caller: &Caller,
        stage: PendingStage,
    ) -> AppResult<PendingQueue> {
        require_admin(caller)?;
        let queue = match stage {
            PendingStage::Funding => {
                PendingQueue::Funding(MoneyReportRepo::list_pending(&self.pool).await?)
            }
            PendingStage::Application => PendingQueue::Application(
                ProjectRepo::list_by_approval(&self.pool, ApprovalStatus::Pending).await?,
            ),
            PendingStage::Midterm => PendingQueue::Midterm(self.midterm_queue().await?),
            PendingStage::FinalReport => {
                PendingQueue::FinalReport(self.final_report_queue().await?)
            }
        };
        Ok(queue)
    }

    async fn midterm_queue(&self) -> AppResult<Vec<MidtermQueueItem>> {
        let projects = ProjectRepo::list_by_approval(&self.pool, ApprovalStatus::Approved).await?;
        let names: Vec<String> = projects.iter().map(|p| p.name.clone()).collect();
        let mut reviews = index_by_project(
            MidtermReviewRepo::list_for_projects(&self.pool, &names).await?,
            |r| &r.project_name,
        );

        let mut items = Vec::new();
        for project in projects {
            let review = reviews.remove(&project.name);
            let midterm = review.as_ref().map(MidtermReview::approval).transpose()?;
            if in_midterm_queue(project.approval()?, midterm) {
                items.push(MidtermQueueItem {
                    project,
                    midterm_review: review,
                });
            }
        }
        Ok(items)
    }

    async fn final_report_queue(&self) -> AppResult<Vec<FinalReportQueueItem>> {
        let projects = ProjectRepo::list_by_approval(&self.pool, ApprovalStatus::Approved).await?;
        let names: Vec<String> = projects.iter().map(|p| p.name.clone()).collect();
        let mut reviews = index_by_project(
            MidtermReviewRepo::list_for_projects(&self.pool, &names).await?,
            |r| &r.project_name,
        );
        let mut reports = index_by_project(
            FinalReportRepo::list_for_projects(&self.pool, &names).await?,
            |r| &r.project_name,
        );

        let mut items = Vec::new();
        for project in projects {
            let review = reviews.remove(&project.name);
            let report = reports.remove(&project.name);
            let midterm = review.as_ref().map(MidtermReview::approval).transpose()?;
            let final_report = report.as_ref().map(FinalReport::approval).transpose()?;

            if !in_final_report_queue(project.approval()?, midterm, final_report) {
                continue;
            }
            // The predicate only admits projects with an approved review.
            if let Some(midterm_review) = review {
                items.push(FinalReportQueueItem {
                    project,
                    midterm_review,
                    final_report: report,
                });
            }
        }
        Ok(items)
    }

    /* ----------------------------------------------------------------------
    Users
    ---------------------------------------------------------------------- */

    pub async fn list_users(&self, caller: &Caller) -> AppResult<Vec<User>> {
        require_admin(caller)?;
        Ok(UserRepo::list(&self.pool).await?)
    }

    /// Provision a user. A taken username surfaces as a 409 through
    /// `uq_users_username`.
    pub async fn create_user(&self, caller: &Caller, input: CreateUser) -> AppResult<User> {
        require_admin(caller)?;
        input.validate()?;

        let user = UserRepo::create(&self.pool, &input).await?;
        tracing::info!(
            user_id = caller.user_id,
            created = user.id,
            role = %user.role,
            "User provisioned",
        );
        Ok(user)
    }

    /// Remove a user together with the projects they lead. Administrators
    /// cannot remove themselves.
    pub async fn delete_user(&self, caller: &Caller, id: DbId) -> AppResult<()> {
        require_admin(caller)?;
        if id == caller.user_id {
            return Err(CoreError::Conflict("Cannot delete your own account".to_string()).into());
        }

        if !UserRepo::delete(&self.pool, id).await? {
            return Err(CoreError::not_found("User", id).into());
        }
        tracing::info!(user_id = caller.user_id, deleted = id, "User deleted");
        Ok(())
    }

    /* ----------------------------------------------------------------------
    Lookups
    ---------------------------------------------------------------------- */

    async fn load_project(&self, name: &str) -> AppResult<Project> {
        Ok(ProjectRepo::find_by_name(&self.pool, name)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", name))?)
    }

    async fn load_money_report(&self, id: DbId) -> AppResult<MoneyReport> {
        Ok(MoneyReportRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Money report", id))?)
    }

    async fn midterm_status(&self, project_name: &str) -> AppResult<Option<ApprovalStatus>> {
        Ok(MidtermReviewRepo::find_by_project(&self.pool, project_name)
            .await?
            .map(|m| m.approval())
            .transpose()?)
    }
}

/// Raised when an upsert found the report approved between the status read
/// and the write.
fn locked_report() -> CoreError {
    CoreError::Conflict("An approved report can no longer be resubmitted".to_string())
}

fn index_by_project<T>(rows: Vec<T>, key: impl Fn(&T) -> &String) -> HashMap<String, T> {
    rows.into_iter().map(|row| (key(&row).clone(), row)).collect()
}
