//! Venues, services and counters owned by an admin.
//!
//! Reads are open to the whole scope; mutations need an admin.

use std::sync::Arc;

use tracing::info;

use crate::auth::{Principal, Scope};
use crate::engine::AccessGate;
use crate::models::{
    Counter, CounterFields, CounterInput, Service, ServiceInput, Venue, VenueInput,
};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn Store>,
    gate: AccessGate,
}

fn deleted(found: bool, what: &str, id: i64) -> AppResult<()> {
    if found {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("{what} {id} not found")))
    }
}

impl Catalog {
    pub fn new(store: Arc<dyn Store>, gate: AccessGate) -> Self {
        Self { store, gate }
    }

    fn admin_scope(principal: &Principal) -> AppResult<Scope> {
        principal.require_admin()?;
        principal.scope()
    }

    // Venues

    pub async fn list_venues(&self, principal: &Principal) -> AppResult<Vec<Venue>> {
        self.store.list_venues(principal.scope()?.owner_id).await
    }

    pub async fn get_venue(&self, principal: &Principal, venue_id: i64) -> AppResult<Venue> {
        self.gate.venue(principal.scope()?, venue_id).await
    }

    pub async fn create_venue(&self, principal: &Principal, input: VenueInput) -> AppResult<Venue> {
        let scope = Self::admin_scope(principal)?;
        let venue = self.store.insert_venue(scope.owner_id, input.validate()?).await?;
        info!(venue_id = venue.venue_id, "Venue created");
        Ok(venue)
    }

    pub async fn update_venue(
        &self,
        principal: &Principal,
        venue_id: i64,
        input: VenueInput,
    ) -> AppResult<Venue> {
        let scope = Self::admin_scope(principal)?;
        let fields = input.validate()?;
        let mut venue = self.gate.venue(scope, venue_id).await?;
        venue.apply(fields);
        self.store.update_venue(&venue).await?;
        Ok(venue)
    }

    pub async fn delete_venue(&self, principal: &Principal, venue_id: i64) -> AppResult<()> {
        let scope = Self::admin_scope(principal)?;
        self.gate.venue(scope, venue_id).await?;
        deleted(self.store.delete_venue(venue_id).await?, "Venue", venue_id)
    }

    // Services

    pub async fn list_services(
        &self,
        principal: &Principal,
        venue_id: Option<i64>,
    ) -> AppResult<Vec<Service>> {
        let scope = principal.scope()?;
        if let Some(venue_id) = venue_id {
            self.gate.venue(scope, venue_id).await?;
        }
        self.store.list_services(scope.owner_id, venue_id).await
    }

    pub async fn get_service(&self, principal: &Principal, service_id: i64) -> AppResult<Service> {
        self.gate.service(principal.scope()?, service_id).await
    }

    pub async fn create_service(
        &self,
        principal: &Principal,
        input: ServiceInput,
    ) -> AppResult<Service> {
        let scope = Self::admin_scope(principal)?;
        let fields = input.validate()?;
        self.gate.venue(scope, fields.venue_id).await?;
        let service = self.store.insert_service(scope.owner_id, fields).await?;
        info!(service_id = service.service_id, "Service created");
        Ok(service)
    }

    pub async fn update_service(
        &self,
        principal: &Principal,
        service_id: i64,
        input: ServiceInput,
    ) -> AppResult<Service> {
        let scope = Self::admin_scope(principal)?;
        let fields = input.validate()?;
        let mut service = self.gate.service(scope, service_id).await?;
        self.gate.venue(scope, fields.venue_id).await?;
        service.apply(fields);
        self.store.update_service(&service).await?;
        Ok(service)
    }

    pub async fn delete_service(&self, principal: &Principal, service_id: i64) -> AppResult<()> {
        let scope = Self::admin_scope(principal)?;
        self.gate.service(scope, service_id).await?;
        deleted(
            self.store.delete_service(service_id).await?,
            "Service",
            service_id,
        )
    }

    // Counters

    pub async fn list_counters(
        &self,
        principal: &Principal,
        venue_id: Option<i64>,
    ) -> AppResult<Vec<Counter>> {
        let scope = principal.scope()?;
        if let Some(venue_id) = venue_id {
            self.gate.venue(scope, venue_id).await?;
        }
        self.store.list_counters(scope.owner_id, venue_id).await
    }

    pub async fn get_counter(&self, principal: &Principal, counter_id: i64) -> AppResult<Counter> {
        self.gate.counter(principal.scope()?, counter_id).await
    }

    async fn check_counter_refs(&self, scope: Scope, fields: &CounterFields) -> AppResult<()> {
        if let Some(service_id) = fields.service_id {
            self.gate.service(scope, service_id).await?;
        }
        if let Some(venue_id) = fields.venue_id {
            self.gate.venue(scope, venue_id).await?;
        }
        Ok(())
    }

    pub async fn create_counter(
        &self,
        principal: &Principal,
        input: CounterInput,
    ) -> AppResult<Counter> {
        let scope = Self::admin_scope(principal)?;
        let fields = input.validate()?;
        self.check_counter_refs(scope, &fields).await?;
        let counter = self.store.insert_counter(scope.owner_id, fields).await?;
        info!(counter_id = counter.counter_id, "Counter created");
        Ok(counter)
    }

    pub async fn update_counter(
        &self,
        principal: &Principal,
        counter_id: i64,
        input: CounterInput,
    ) -> AppResult<Counter> {
        let scope = Self::admin_scope(principal)?;
        let fields = input.validate()?;
        let mut counter = self.gate.counter(scope, counter_id).await?;
        self.check_counter_refs(scope, &fields).await?;
        counter.apply(fields);
        self.store.update_counter(&counter).await?;
        Ok(counter)
    }

    pub async fn delete_counter(&self, principal: &Principal, counter_id: i64) -> AppResult<()> {
        let scope = Self::admin_scope(principal)?;
        self.gate.counter(scope, counter_id).await?;
        deleted(
            self.store.delete_counter(counter_id).await?,
            "Counter",
            counter_id,
        )
    }
}
