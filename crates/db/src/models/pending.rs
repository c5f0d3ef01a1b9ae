//! Rows surfaced by the administrator pending queues and the results page.

use serde::Serialize;

use super::final_report::FinalReport;
use super::midterm_review::MidtermReview;
use super::money_report::MoneyReport;
use super::project::Project;

/// A stage-2 queue entry. `midterm_review` is `None` when the project has
/// not submitted one yet.
#[derive(Debug, Clone, Serialize)]
pub struct MidtermQueueItem {
    pub project: Project,
    pub midterm_review: Option<MidtermReview>,
}

/// A stage-3 queue entry. The midterm review is always present and approved;
/// `final_report` is `None` when not submitted yet.
#[derive(Debug, Clone, Serialize)]
pub struct FinalReportQueueItem {
    pub project: Project,
    pub midterm_review: MidtermReview,
    pub final_report: Option<FinalReport>,
}

/// Contents of one administrator queue, tagged by stage.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", content = "items", rename_all = "snake_case")]
pub enum PendingQueue {
    Funding(Vec<MoneyReport>),
    Application(Vec<Project>),
    Midterm(Vec<MidtermQueueItem>),
    FinalReport(Vec<FinalReportQueueItem>),
}

/// One of the caller's projects together with its funding requests.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectFunding {
    pub project: Project,
    pub reports: Vec<MoneyReport>,
}
