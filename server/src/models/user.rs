use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::{AppError, AppResult};

/// Closed set of roles carried in the `role_id` column and the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Operator,
}

impl Role {
    pub fn id(self) -> i32 {
        match self {
            Role::SuperAdmin => 0,
            Role::Admin => 1,
            Role::Operator => 2,
        }
    }

    pub fn from_id(id: i32) -> AppResult<Self> {
        match id {
            0 => Ok(Role::SuperAdmin),
            1 => Ok(Role::Admin),
            2 => Ok(Role::Operator),
            other => Err(AppError::ValidationError(format!("Unknown role id {other}"))),
        }
    }

    /// Resolves a role id coming from user management. Ids 0 and 1 are
    /// reserved and can only be granted by registration or seeding.
    pub fn assignable_from_id(id: i32) -> AppResult<Self> {
        let role = Role::from_id(id)?;
        if !role.is_assignable() {
            return Err(AppError::InvalidRole(
                "Cannot create user with role super admin or admin".to_string(),
            ));
        }
        Ok(role)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "super_admin" | "superadmin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "operator" => Some(Role::Operator),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Operator => "operator",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    pub fn is_assignable(self) -> bool {
        matches!(self, Role::Operator)
    }
}

impl TryFrom<i32> for Role {
    type Error = AppError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Role::from_id(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub company_name: String,
    #[sqlx(rename = "role_id", try_from = "i32")]
    pub role: Role,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub owner_id: Option<i64>,
}

impl User {
    /// Whether `owner_id` is this user or the admin that created this user.
    pub fn belongs_to(&self, owner_id: i64) -> bool {
        self.user_id == owner_id || self.owner_id == Some(owner_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub company_name: String,
    pub role: Role,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub owner_id: Option<i64>,
}
