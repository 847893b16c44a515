use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::models::{DisplayFilter, NewDisplay, QueueDisplay};
use crate::store::{DisplayMutation, DisplayStore, PgStore};
use crate::utils::error::{AppError, AppResult};

#[async_trait]
impl DisplayStore for PgStore {
    async fn insert_display(&self, display: NewDisplay) -> AppResult<QueueDisplay> {
        let created: QueueDisplay = sqlx::query_as(
            r#"
            INSERT INTO queue_displays (venue_id, user_id, service_id, counter_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(display.venue_id)
        .bind(display.user_id)
        .bind(display.service_id)
        .bind(display.counter_id)
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::from_store(e, "a display already exists for this counter"))?;
        Ok(created)
    }

    async fn find_display(&self, counter_id: i64) -> AppResult<Option<QueueDisplay>> {
        let display: Option<QueueDisplay> = sqlx::query_as("SELECT * FROM queue_displays WHERE counter_id = $1")
            .bind(counter_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(display)
    }

    async fn list_displays(&self, filter: &DisplayFilter) -> AppResult<Vec<QueueDisplay>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM queue_displays WHERE TRUE");
        if let Some(owner_id) = filter.owner_id {
            qb.push(" AND user_id = ").push_bind(owner_id);
        }
        if let Some(venue_id) = filter.venue_id {
            qb.push(" AND venue_id = ").push_bind(venue_id);
        }
        if let Some(service_id) = filter.service_id {
            qb.push(" AND service_id = ").push_bind(service_id);
        }
        if let Some(counter_id) = filter.counter_id {
            qb.push(" AND counter_id = ").push_bind(counter_id);
        }
        qb.push(" ORDER BY counter_id");

        let displays = qb
            .build_query_as::<QueueDisplay>()
            .fetch_all(self.pool())
            .await?;
        Ok(displays)
    }

    async fn mutate_display(
        &self,
        counter_id: i64,
        mutation: DisplayMutation,
    ) -> AppResult<QueueDisplay> {
        let mut tx = self.pool().begin().await?;

        let mut display: QueueDisplay =
            sqlx::query_as("SELECT * FROM queue_displays WHERE counter_id = $1 FOR UPDATE")
                .bind(counter_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Display for counter {counter_id} not found"))
                })?;

        mutation(&mut display)?;

        let updated: QueueDisplay = sqlx::query_as(
            r#"
            UPDATE queue_displays
            SET current_ticket = $2, next_tickets = $3, updated_at = NOW()
            WHERE display_id = $1
            RETURNING *
            "#,
        )
        .bind(display.display_id)
        .bind(&display.current_ticket)
        .bind(display.next_tickets.encode()?)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn reset_displays(&self, owner_id: Option<i64>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE queue_displays SET current_ticket = '', next_tickets = '[]', updated_at = NOW() \
             WHERE ($1::BIGINT IS NULL OR user_id = $1)",
        )
        .bind(owner_id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }
}
