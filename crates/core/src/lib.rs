//! Domain logic for the course ideology project workflow.
//!
//! Everything in this crate is pure: no database, no HTTP. The DB and API
//! crates call into it to decide whether a status change is allowed.

pub mod access;
pub mod error;
pub mod roles;
pub mod types;
pub mod validation;
pub mod workflow;
