use async_trait::async_trait;

use crate::models::{NewAssignment, UserCounterMap};
use crate::store::{AssignmentStore, PgStore};
use crate::utils::error::AppResult;

#[async_trait]
impl AssignmentStore for PgStore {
    async fn insert_assignment(&self, assignment: NewAssignment) -> AppResult<UserCounterMap> {
        let created: UserCounterMap = sqlx::query_as(
            r#"
            INSERT INTO user_counter_map (user_id, counter_id, owner_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(assignment.user_id)
        .bind(assignment.counter_id)
        .bind(assignment.owner_id)
        .fetch_one(self.pool())
        .await?;
        Ok(created)
    }

    async fn find_assignment(&self, id: i64) -> AppResult<Option<UserCounterMap>> {
        let assignment: Option<UserCounterMap> =
            sqlx::query_as("SELECT * FROM user_counter_map WHERE user_counter_map_id = $1")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        Ok(assignment)
    }

    async fn list_assignments(&self, owner_id: i64) -> AppResult<Vec<UserCounterMap>> {
        let assignments: Vec<UserCounterMap> = sqlx::query_as(
            "SELECT * FROM user_counter_map WHERE owner_id = $1 ORDER BY user_counter_map_id",
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;
        Ok(assignments)
    }

    async fn update_assignment(&self, assignment: &UserCounterMap) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE user_counter_map
            SET user_id = $2, counter_id = $3, assigned_at = $4
            WHERE user_counter_map_id = $1
            "#,
        )
        .bind(assignment.user_counter_map_id)
        .bind(assignment.user_id)
        .bind(assignment.counter_id)
        .bind(assignment.assigned_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_assignment(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_counter_map WHERE user_counter_map_id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn first_assignment_for_counter(
        &self,
        counter_id: i64,
    ) -> AppResult<Option<UserCounterMap>> {
        let assignment: Option<UserCounterMap> = sqlx::query_as(
            r#"
            SELECT * FROM user_counter_map
            WHERE counter_id = $1
            ORDER BY user_counter_map_id
            LIMIT 1
            "#,
        )
        .bind(counter_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(assignment)
    }

    async fn first_assignment_for_user(
        &self,
        user_id: i64,
    ) -> AppResult<Option<UserCounterMap>> {
        let assignment: Option<UserCounterMap> = sqlx::query_as(
            r#"
            SELECT * FROM user_counter_map
            WHERE user_id = $1
            ORDER BY user_counter_map_id
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(assignment)
    }
}
