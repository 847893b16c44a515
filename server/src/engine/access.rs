//! Ownership checks shared by every component.
//!
//! An id that does not exist is `NotFound`; an id owned by another admin is
//! `Forbidden`. Both are decided before any mutation runs.

use std::sync::Arc;

use crate::auth::{Principal, Scope};
use crate::models::{Counter, QueueDisplay, Service, Ticket, User, UserCounterMap, Venue};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AccessGate {
    store: Arc<dyn Store>,
}

fn require_owner(scope: Scope, owner_id: Option<i64>, what: &str) -> AppResult<()> {
    if owner_id.is_some_and(|id| scope.owns(id)) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{what} does not belong to your account"
        )))
    }
}

impl AccessGate {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn venue(&self, scope: Scope, venue_id: i64) -> AppResult<Venue> {
        let venue = self
            .store
            .find_venue(venue_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Venue {venue_id} not found")))?;
        require_owner(scope, Some(venue.user_id), "Venue")?;
        Ok(venue)
    }

    pub async fn service(&self, scope: Scope, service_id: i64) -> AppResult<Service> {
        let service = self
            .store
            .find_service(service_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {service_id} not found")))?;
        require_owner(scope, service.user_id, "Service")?;
        Ok(service)
    }

    pub async fn counter(&self, scope: Scope, counter_id: i64) -> AppResult<Counter> {
        let counter = self
            .store
            .find_counter(counter_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Counter {counter_id} not found")))?;
        require_owner(scope, Some(counter.user_id), "Counter")?;
        Ok(counter)
    }

    pub async fn ticket(&self, scope: Scope, ticket_id: i64) -> AppResult<Ticket> {
        let ticket = self
            .store
            .find_ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id} not found")))?;
        require_owner(scope, Some(ticket.user_id), "Ticket")?;
        Ok(ticket)
    }

    pub async fn display(&self, scope: Scope, counter_id: i64) -> AppResult<QueueDisplay> {
        let display = self.store.find_display(counter_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Display for counter {counter_id} not found"))
        })?;
        require_owner(scope, Some(display.user_id), "Display")?;
        Ok(display)
    }

    pub async fn assignment(&self, scope: Scope, id: i64) -> AppResult<UserCounterMap> {
        let assignment = self
            .store
            .find_assignment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Mapping {id} not found")))?;
        require_owner(scope, Some(assignment.owner_id), "Mapping")?;
        Ok(assignment)
    }

    /// Any user in the scope's owner chain: the admin itself or one of its
    /// operators.
    pub async fn member(&self, scope: Scope, user_id: i64) -> AppResult<User> {
        let user = self.find_user(user_id).await?;
        if user.belongs_to(scope.owner_id) {
            Ok(user)
        } else {
            Err(AppError::Forbidden(
                "User does not belong to your account".to_string(),
            ))
        }
    }

    /// A user record the caller may read or edit: itself, or for admins any
    /// user they created.
    pub async fn user(&self, principal: &Principal, user_id: i64) -> AppResult<User> {
        let user = self.find_user(user_id).await?;
        let is_self = user.user_id == principal.user_id;
        let is_managed = principal.is_admin() && user.owner_id == Some(principal.user_id);
        if is_self || is_managed {
            Ok(user)
        } else {
            Err(AppError::Forbidden(
                "User does not belong to your account".to_string(),
            ))
        }
    }

    async fn find_user(&self, user_id: i64) -> AppResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role, VenueInput};
    use crate::store::{CatalogStore, MemoryStore, UserStore};

    async fn admin(store: &MemoryStore, name: &str) -> User {
        store
            .insert_user(NewUser {
                company_name: format!("{name} corp"),
                role: Role::SuperAdmin,
                username: name.into(),
                password_hash: String::new(),
                email: format!("{name}@example.com"),
                owner_id: None,
            })
            .await
            .unwrap()
    }

    fn venue_input(name: &str) -> VenueInput {
        serde_json::from_value(serde_json::json!({ "venue_name": name })).unwrap()
    }

    #[tokio::test]
    async fn test_missing_and_foreign_venues_are_distinguished() {
        let store = Arc::new(MemoryStore::new());
        let a = admin(&store, "alice").await;
        let b = admin(&store, "bob").await;
        let venue = store
            .insert_venue(b.user_id, venue_input("Bob Hall").validate().unwrap())
            .await
            .unwrap();

        let gate = AccessGate::new(store.clone());
        let scope_a = Scope { owner_id: a.user_id };

        assert!(matches!(
            gate.venue(scope_a, venue.venue_id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            gate.venue(scope_a, 999).await,
            Err(AppError::NotFound(_))
        ));
        let scope_b = Scope { owner_id: b.user_id };
        assert_eq!(
            gate.venue(scope_b, venue.venue_id).await.unwrap().venue_name,
            "Bob Hall"
        );
    }

    #[tokio::test]
    async fn test_operators_see_their_admins_members() {
        let store = Arc::new(MemoryStore::new());
        let a = admin(&store, "alice").await;
        let op = store
            .insert_user(NewUser {
                company_name: a.company_name.clone(),
                role: Role::Operator,
                username: "op".into(),
                password_hash: String::new(),
                email: "op@example.com".into(),
                owner_id: Some(a.user_id),
            })
            .await
            .unwrap();
        let gate = AccessGate::new(store.clone());
        let scope = Scope { owner_id: a.user_id };
        assert_eq!(gate.member(scope, op.user_id).await.unwrap().username, "op");
        assert_eq!(gate.member(scope, a.user_id).await.unwrap().username, "alice");
    }
}
