//! Accounts: registration, login and admin-managed operators.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{Principal, TokenService};
use crate::config::SuperAdminSeed;
use crate::engine::AccessGate;
use crate::models::{NewUser, Role, User};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validate::{email, required};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
}

fn password(value: &str) -> AppResult<&str> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn Store>,
    gate: AccessGate,
    tokens: TokenService,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn Store>, gate: AccessGate, tokens: TokenService) -> Self {
        Self {
            store,
            gate,
            tokens,
        }
    }

    /// Creates a tenant administrator with no owner. Super admins are only
    /// ever created by [`UserDirectory::seed_super_admin`].
    pub async fn register(&self, req: RegisterRequest) -> AppResult<User> {
        let user = self
            .store
            .insert_user(NewUser {
                company_name: required(&req.company_name, "company_name")?,
                role: Role::Admin,
                username: required(&req.username, "username")?,
                password_hash: hash_password(password(&req.password)?)?,
                email: email(&req.email, "email")?,
                owner_id: None,
            })
            .await?;
        info!(user_id = user.user_id, "Administrator registered");
        Ok(user)
    }

    /// Creates the configured super admin unless the username is taken.
    /// Returns `None` when the account already exists.
    pub async fn seed_super_admin(&self, seed: &SuperAdminSeed) -> AppResult<Option<User>> {
        let username = required(&seed.username, "SUPER_ADMIN_USERNAME")?;
        if self.store.find_user_by_username(&username).await?.is_some() {
            return Ok(None);
        }
        let user = self
            .store
            .insert_user(NewUser {
                company_name: seed.company_name.clone(),
                role: Role::SuperAdmin,
                username,
                password_hash: hash_password(password(&seed.password)?)?,
                email: email(&seed.email, "SUPER_ADMIN_EMAIL")?,
                owner_id: None,
            })
            .await?;
        info!(user_id = user.user_id, "Super admin seeded");
        Ok(Some(user))
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        let username = req.username.trim();
        let user = match self.store.find_user_by_username(username).await? {
            Some(user) if verify_password(&req.password, &user.password_hash) => user,
            _ => {
                warn!(username, "Failed login attempt");
                return Err(AppError::AuthError(
                    "Invalid username or password".to_string(),
                ));
            }
        };

        let token = self.tokens.issue(&user)?;
        info!(user_id = user.user_id, "User logged in");
        Ok(LoginResponse {
            token,
            token_type: "Bearer",
            expires_in: self.tokens.expires_in_secs(),
            user,
        })
    }

    pub async fn me(&self, principal: &Principal) -> AppResult<User> {
        self.store
            .find_user(principal.user_id)
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))
    }

    /// Admins see themselves and every user they created; others see only
    /// themselves.
    pub async fn list(&self, principal: &Principal) -> AppResult<Vec<User>> {
        if principal.is_admin() {
            self.store.list_users_for_admin(principal.user_id).await
        } else {
            Ok(vec![self.me(principal).await?])
        }
    }

    pub async fn create(&self, principal: &Principal, req: CreateUserRequest) -> AppResult<User> {
        principal.require_admin()?;
        let role = Role::assignable_from_id(req.role_id)?;

        let user = self
            .store
            .insert_user(NewUser {
                company_name: principal.company_name.clone(),
                role,
                username: required(&req.username, "username")?,
                password_hash: hash_password(password(&req.password)?)?,
                email: email(&req.email, "email")?,
                owner_id: Some(principal.user_id),
            })
            .await?;
        info!(
            user_id = user.user_id,
            owner_id = principal.user_id,
            role = user.role.as_str(),
            "User created"
        );
        Ok(user)
    }

    pub async fn get(&self, principal: &Principal, user_id: i64) -> AppResult<User> {
        self.gate.user(principal, user_id).await
    }

    pub async fn update(
        &self,
        principal: &Principal,
        user_id: i64,
        req: UpdateUserRequest,
    ) -> AppResult<User> {
        let mut user = self.gate.user(principal, user_id).await?;

        if let Some(role_id) = req.role_id {
            let role = Role::assignable_from_id(role_id)?;
            if user.role != role {
                if user.role.is_admin() || !principal.is_admin() {
                    return Err(AppError::InvalidRole(
                        "Cannot change the role of this user".to_string(),
                    ));
                }
                user.role = role;
            }
        }
        if let Some(username) = req.username.as_deref() {
            user.username = required(username, "username")?;
        }
        if let Some(address) = req.email.as_deref() {
            user.email = email(address, "email")?;
        }
        if let Some(secret) = req.password.as_deref() {
            user.password_hash = hash_password(password(secret)?)?;
        }

        self.store.update_user(&user).await?;
        Ok(user)
    }

    pub async fn delete(&self, principal: &Principal, user_id: i64) -> AppResult<()> {
        principal.require_admin()?;
        let user = self.gate.user(principal, user_id).await?;
        if user.owner_id != Some(principal.user_id) {
            return Err(AppError::Forbidden(
                "Admins can only delete users they created".to_string(),
            ));
        }
        if !self.store.delete_user(user_id).await? {
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        }
        info!(user_id, "User deleted");
        Ok(())
    }
}
