//! User entity model and DTOs.

use cipm_core::roles::ROLE_USER;
use cipm_core::types::{DbId, Timestamp};
use cipm_core::validation::{validate_not_blank, validate_role};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub institution: String,
    pub user_code: String,
    /// `"admin"` or `"user"`.
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning a user. Credentials stay with the identity
/// provider; the row only anchors ownership and the role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub institution: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub user_code: String,
    #[serde(default = "default_role")]
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

fn default_role() -> String {
    ROLE_USER.to_string()
}
