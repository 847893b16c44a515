use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::models::ticket::next_queue_number;
use crate::models::{NewTicket, Ticket, TicketQuery, TicketStatus};
use crate::store::{PgStore, TicketMutation, TicketStore};
use crate::utils::error::{AppError, AppResult};

const NUMERIC_QUEUE_NUMBER: &str =
    "CASE WHEN queue_number ~ '^[0-9]+$' THEN queue_number::BIGINT END";

#[async_trait]
impl TicketStore for PgStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> AppResult<Ticket> {
        let mut tx = self.pool().begin().await?;

        // Serializes numbering per service for the rest of the transaction.
        sqlx::query("SELECT service_id FROM services WHERE service_id = $1 FOR UPDATE")
            .bind(ticket.service_id)
            .fetch_optional(&mut *tx)
            .await?;

        let last_sql =
            format!("SELECT MAX({NUMERIC_QUEUE_NUMBER}) FROM queue_tickets WHERE service_id = $1");
        let last: Option<i64> = sqlx::query_scalar(&last_sql)
            .bind(ticket.service_id)
            .fetch_one(&mut *tx)
            .await?;

        let created: Ticket = sqlx::query_as(
            r#"
            INSERT INTO queue_tickets (
                user_id, service_id, venue_id, customer_name, customer_email,
                customer_phone, queue_number, token, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(ticket.user_id)
        .bind(ticket.service_id)
        .bind(ticket.venue_id)
        .bind(&ticket.customer_name)
        .bind(&ticket.customer_email)
        .bind(&ticket.customer_phone)
        .bind(next_queue_number(last).to_string())
        .bind(&ticket.token)
        .bind(TicketStatus::Waiting.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_store(e, "ticket token already exists"))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_ticket(&self, ticket_id: i64) -> AppResult<Option<Ticket>> {
        let ticket: Option<Ticket> =
            sqlx::query_as("SELECT * FROM queue_tickets WHERE ticket_id = $1")
                .bind(ticket_id)
                .fetch_optional(self.pool())
                .await?;
        Ok(ticket)
    }

    async fn find_ticket_by_token(&self, token: &str) -> AppResult<Option<Ticket>> {
        let ticket: Option<Ticket> =
            sqlx::query_as("SELECT * FROM queue_tickets WHERE token = $1")
                .bind(token)
                .fetch_optional(self.pool())
                .await?;
        Ok(ticket)
    }

    async fn list_tickets(&self, query: &TicketQuery) -> AppResult<Vec<Ticket>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM queue_tickets WHERE TRUE");

        if let Some(owner_id) = query.owner_id {
            qb.push(" AND user_id = ").push_bind(owner_id);
        }
        if !query.statuses.is_empty() {
            let statuses: Vec<String> = query
                .statuses
                .iter()
                .map(|s| s.as_str().to_string())
                .collect();
            qb.push(" AND status = ANY(").push_bind(statuses).push(")");
        }
        if let Some(venue_id) = query.venue_id {
            qb.push(" AND venue_id = ").push_bind(venue_id);
        }
        if let Some(service_id) = query.service_id {
            qb.push(" AND service_id = ").push_bind(service_id);
        }
        if let Some(counter_id) = query.counter_id {
            qb.push(" AND counter_id = ").push_bind(counter_id);
        }
        if let Some(day) = query.created_on {
            qb.push(" AND (created_at AT TIME ZONE 'UTC')::date = ")
                .push_bind(day);
        }
        qb.push(" ORDER BY ")
            .push(NUMERIC_QUEUE_NUMBER)
            .push(" ASC NULLS LAST, ticket_id ASC");

        let tickets = qb.build_query_as::<Ticket>().fetch_all(self.pool()).await?;
        Ok(tickets)
    }

    async fn mutate_ticket(&self, ticket_id: i64, mutation: TicketMutation) -> AppResult<Ticket> {
        let mut tx = self.pool().begin().await?;

        let mut ticket: Ticket =
            sqlx::query_as("SELECT * FROM queue_tickets WHERE ticket_id = $1 FOR UPDATE")
                .bind(ticket_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id} not found")))?;

        mutation(&mut ticket)?;

        sqlx::query(
            r#"
            UPDATE queue_tickets
            SET status = $2, called_at = $3, completed_at = $4, skipped_at = $5,
                operator_id = $6, counter_id = $7
            WHERE ticket_id = $1
            "#,
        )
        .bind(ticket.ticket_id)
        .bind(ticket.status.as_str())
        .bind(ticket.called_at)
        .bind(ticket.completed_at)
        .bind(ticket.skipped_at)
        .bind(ticket.operator_id)
        .bind(ticket.counter_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ticket)
    }

    async fn delete_ticket(&self, ticket_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM queue_tickets WHERE ticket_id = $1")
            .bind(ticket_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
