pub mod admin;
pub mod funding;
pub mod projects;
pub mod results;
pub mod reviews;

use cipm_core::error::CoreError;
use cipm_core::workflow::Decision;
use serde::Deserialize;

/// Request body for the administrator decision endpoints.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// `"approve"` or `"reject"`.
    pub decision: String,
}

impl DecisionRequest {
    pub fn parse(&self) -> Result<Decision, CoreError> {
        self.decision.parse()
    }
}

/// Request body for the reviewer comment endpoints.
#[derive(Debug, Deserialize)]
pub struct CommentsRequest {
    pub comments: String,
}
