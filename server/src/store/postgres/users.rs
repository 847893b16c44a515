use async_trait::async_trait;

use crate::models::{NewUser, User};
use crate::store::{PgStore, UserStore};
use crate::utils::error::{AppError, AppResult};

const DUPLICATE_USER: &str = "username or email already registered";

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let created: User = sqlx::query_as(
            r#"
            INSERT INTO users (company_name, role_id, username, password_hash, email, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.company_name)
        .bind(user.role.id())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(user.owner_id)
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::from_store(e, DUPLICATE_USER))?;
        Ok(created)
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn list_users_for_admin(&self, admin_id: i64) -> AppResult<Vec<User>> {
        let users: Vec<User> = sqlx::query_as(
            "SELECT * FROM users WHERE user_id = $1 OR owner_id = $1 ORDER BY user_id",
        )
        .bind(admin_id)
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET company_name = $2, role_id = $3, username = $4, password_hash = $5, email = $6
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id)
        .bind(&user.company_name)
        .bind(user.role.id())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::from_store(e, DUPLICATE_USER))?;
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
