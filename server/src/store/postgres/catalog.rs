use async_trait::async_trait;

use crate::models::{Counter, CounterFields, Service, ServiceFields, Venue, VenueFields};
use crate::store::{CatalogStore, PgStore};
use crate::utils::error::AppResult;

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_venue(&self, owner_id: i64, fields: VenueFields) -> AppResult<Venue> {
        let venue: Venue = sqlx::query_as(
            r#"
            INSERT INTO venues (
                user_id, venue_name, address, city, province, postal_code,
                phone, email, open_time, close_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&fields.venue_name)
        .bind(&fields.address)
        .bind(&fields.city)
        .bind(&fields.province)
        .bind(&fields.postal_code)
        .bind(&fields.phone)
        .bind(&fields.email)
        .bind(fields.open_time)
        .bind(fields.close_time)
        .fetch_one(self.pool())
        .await?;
        Ok(venue)
    }

    async fn find_venue(&self, venue_id: i64) -> AppResult<Option<Venue>> {
        let venue: Option<Venue> = sqlx::query_as("SELECT * FROM venues WHERE venue_id = $1")
            .bind(venue_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(venue)
    }

    async fn list_venues(&self, owner_id: i64) -> AppResult<Vec<Venue>> {
        let venues: Vec<Venue> =
            sqlx::query_as("SELECT * FROM venues WHERE user_id = $1 ORDER BY venue_id")
                .bind(owner_id)
                .fetch_all(self.pool())
                .await?;
        Ok(venues)
    }

    async fn update_venue(&self, venue: &Venue) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE venues
            SET venue_name = $2, address = $3, city = $4, province = $5,
                postal_code = $6, phone = $7, email = $8, open_time = $9, close_time = $10
            WHERE venue_id = $1
            "#,
        )
        .bind(venue.venue_id)
        .bind(&venue.venue_name)
        .bind(&venue.address)
        .bind(&venue.city)
        .bind(&venue.province)
        .bind(&venue.postal_code)
        .bind(&venue.phone)
        .bind(&venue.email)
        .bind(venue.open_time)
        .bind(venue.close_time)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_venue(&self, venue_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM venues WHERE venue_id = $1")
            .bind(venue_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_service(&self, owner_id: i64, fields: ServiceFields) -> AppResult<Service> {
        let service: Service = sqlx::query_as(
            r#"
            INSERT INTO services (user_id, venue_id, service_name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(fields.venue_id)
        .bind(&fields.service_name)
        .bind(&fields.description)
        .fetch_one(self.pool())
        .await?;
        Ok(service)
    }

    async fn find_service(&self, service_id: i64) -> AppResult<Option<Service>> {
        let service: Option<Service> =
            sqlx::query_as("SELECT * FROM services WHERE service_id = $1")
                .bind(service_id)
                .fetch_optional(self.pool())
                .await?;
        Ok(service)
    }

    async fn list_services(
        &self,
        owner_id: i64,
        venue_id: Option<i64>,
    ) -> AppResult<Vec<Service>> {
        let services: Vec<Service> = sqlx::query_as(
            r#"
            SELECT * FROM services
            WHERE user_id = $1 AND ($2::BIGINT IS NULL OR venue_id = $2)
            ORDER BY service_id
            "#,
        )
        .bind(owner_id)
        .bind(venue_id)
        .fetch_all(self.pool())
        .await?;
        Ok(services)
    }

    async fn update_service(&self, service: &Service) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE services
            SET venue_id = $2, service_name = $3, description = $4
            WHERE service_id = $1
            "#,
        )
        .bind(service.service_id)
        .bind(service.venue_id)
        .bind(&service.service_name)
        .bind(&service.description)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_service(&self, service_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM services WHERE service_id = $1")
            .bind(service_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_counter(&self, owner_id: i64, fields: CounterFields) -> AppResult<Counter> {
        let counter: Counter = sqlx::query_as(
            r#"
            INSERT INTO counters (
                venue_id, service_id, counter_name, operator_name, operator_nik,
                open_time, close_time, is_vip, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(fields.venue_id)
        .bind(fields.service_id)
        .bind(&fields.counter_name)
        .bind(&fields.operator_name)
        .bind(&fields.operator_nik)
        .bind(fields.open_time)
        .bind(fields.close_time)
        .bind(fields.is_vip)
        .bind(owner_id)
        .fetch_one(self.pool())
        .await?;
        Ok(counter)
    }

    async fn find_counter(&self, counter_id: i64) -> AppResult<Option<Counter>> {
        let counter: Option<Counter> =
            sqlx::query_as("SELECT * FROM counters WHERE counter_id = $1")
                .bind(counter_id)
                .fetch_optional(self.pool())
                .await?;
        Ok(counter)
    }

    async fn list_counters(
        &self,
        owner_id: i64,
        venue_id: Option<i64>,
    ) -> AppResult<Vec<Counter>> {
        let counters: Vec<Counter> = sqlx::query_as(
            r#"
            SELECT * FROM counters
            WHERE user_id = $1 AND ($2::BIGINT IS NULL OR venue_id = $2)
            ORDER BY counter_id
            "#,
        )
        .bind(owner_id)
        .bind(venue_id)
        .fetch_all(self.pool())
        .await?;
        Ok(counters)
    }

    async fn update_counter(&self, counter: &Counter) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE counters
            SET venue_id = $2, service_id = $3, counter_name = $4, operator_name = $5,
                operator_nik = $6, open_time = $7, close_time = $8, is_vip = $9
            WHERE counter_id = $1
            "#,
        )
        .bind(counter.counter_id)
        .bind(counter.venue_id)
        .bind(counter.service_id)
        .bind(&counter.counter_name)
        .bind(&counter.operator_name)
        .bind(&counter.operator_nik)
        .bind(counter.open_time)
        .bind(counter.close_time)
        .bind(counter.is_vip)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_counter(&self, counter_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM counters WHERE counter_id = $1")
            .bind(counter_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
