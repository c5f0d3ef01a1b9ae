use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::WorkflowEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the config sits
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cipm_db::DbPool,
    /// Server configuration (JWT settings, workflow policy).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Workflow engine bound to this state's pool and configured policy.
    pub fn engine(&self) -> WorkflowEngine {
        WorkflowEngine::new(self.pool.clone(), self.config.workflow)
    }
}
