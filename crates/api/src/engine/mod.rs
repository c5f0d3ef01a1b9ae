//! Approval workflow engine.
//!
//! Sequences the pure rules from `cipm_core::workflow` and
//! `cipm_core::access` with the repositories in `cipm_db`. Handlers stay
//! thin: they extract the caller and the body, then call one engine method.

pub mod workflow;

pub use workflow::WorkflowEngine;
