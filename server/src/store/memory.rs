//! In-process store used when no database is configured and by the tests.
//!
//! A single async mutex guards every table, so each call observes and
//! leaves a consistent snapshot.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::models::ticket::{next_queue_number, sort_by_queue_number};
use crate::models::{
    Counter, CounterFields, DisplayFilter, NewAssignment, NewDisplay, NewTicket, NewUser,
    NextTickets, QueueDisplay, Service, ServiceFields, Ticket, TicketQuery, TicketStatus, User,
    UserCounterMap, Venue, VenueFields,
};
use crate::store::{
    AssignmentStore, CatalogStore, DisplayMutation, DisplayStore, TicketMutation, TicketStore,
    UserStore,
};
use crate::utils::error::{AppError, AppResult};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    venues: Table<Venue>,
    services: Table<Service>,
    counters: Table<Counter>,
    tickets: Table<Ticket>,
    displays: Table<QueueDisplay>,
    assignments: Table<UserCounterMap>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{what} {id} not found"))
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> AppResult<Ticket> {
        let mut tables = self.tables.lock().await;
        let tickets = &mut tables.tickets;

        if tickets.rows.values().any(|t| t.token == ticket.token) {
            return Err(AppError::Conflict("ticket token already exists".to_string()));
        }

        let last = tickets
            .rows
            .values()
            .filter(|t| t.service_id == Some(ticket.service_id))
            .filter_map(Ticket::numeric_queue_number)
            .max();

        let ticket_id = tickets.next_id();
        let row = Ticket {
            ticket_id,
            user_id: ticket.user_id,
            service_id: Some(ticket.service_id),
            counter_id: None,
            venue_id: Some(ticket.venue_id),
            customer_name: ticket.customer_name,
            customer_email: ticket.customer_email,
            customer_phone: ticket.customer_phone,
            photo_url: String::new(),
            queue_number: next_queue_number(last).to_string(),
            token: ticket.token,
            status: TicketStatus::Waiting,
            created_at: Utc::now(),
            called_at: None,
            completed_at: None,
            skipped_at: None,
            operator_id: None,
        };
        tickets.rows.insert(ticket_id, row.clone());
        Ok(row)
    }

    async fn find_ticket(&self, ticket_id: i64) -> AppResult<Option<Ticket>> {
        Ok(self.tables.lock().await.tickets.rows.get(&ticket_id).cloned())
    }

    async fn find_ticket_by_token(&self, token: &str) -> AppResult<Option<Ticket>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tickets
            .rows
            .values()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn list_tickets(&self, query: &TicketQuery) -> AppResult<Vec<Ticket>> {
        let tables = self.tables.lock().await;
        let mut tickets: Vec<Ticket> = tables
            .tickets
            .rows
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        sort_by_queue_number(&mut tickets);
        Ok(tickets)
    }

    async fn mutate_ticket(&self, ticket_id: i64, mutation: TicketMutation) -> AppResult<Ticket> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .tickets
            .rows
            .get_mut(&ticket_id)
            .ok_or_else(|| not_found("Ticket", ticket_id))?;

        let mut updated = row.clone();
        mutation(&mut updated)?;
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete_ticket(&self, ticket_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .tickets
            .rows
            .remove(&ticket_id)
            .is_some())
    }
}

#[async_trait]
impl DisplayStore for MemoryStore {
    async fn insert_display(&self, display: NewDisplay) -> AppResult<QueueDisplay> {
        let mut tables = self.tables.lock().await;
        let displays = &mut tables.displays;

        if displays
            .rows
            .values()
            .any(|d| d.counter_id == display.counter_id)
        {
            return Err(AppError::Conflict(
                "a display already exists for this counter".to_string(),
            ));
        }

        let display_id = displays.next_id();
        let row = QueueDisplay {
            display_id,
            venue_id: display.venue_id,
            user_id: display.user_id,
            service_id: display.service_id,
            counter_id: display.counter_id,
            current_ticket: String::new(),
            next_tickets: NextTickets::new(),
            updated_at: Utc::now(),
        };
        displays.rows.insert(display_id, row.clone());
        Ok(row)
    }

    async fn find_display(&self, counter_id: i64) -> AppResult<Option<QueueDisplay>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .displays
            .rows
            .values()
            .find(|d| d.counter_id == counter_id)
            .cloned())
    }

    async fn list_displays(&self, filter: &DisplayFilter) -> AppResult<Vec<QueueDisplay>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .displays
            .rows
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    async fn mutate_display(
        &self,
        counter_id: i64,
        mutation: DisplayMutation,
    ) -> AppResult<QueueDisplay> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .displays
            .rows
            .values_mut()
            .find(|d| d.counter_id == counter_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Display for counter {counter_id} not found"))
            })?;

        let mut updated = row.clone();
        mutation(&mut updated)?;
        updated.updated_at = Utc::now();
        *row = updated.clone();
        Ok(updated)
    }

    async fn reset_displays(&self, owner_id: Option<i64>) -> AppResult<u64> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let mut touched = 0;
        for display in tables
            .displays
            .rows
            .values_mut()
            .filter(|d| owner_id.map_or(true, |id| d.user_id == id))
        {
            display.clear();
            display.updated_at = now;
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_venue(&self, owner_id: i64, fields: VenueFields) -> AppResult<Venue> {
        let mut tables = self.tables.lock().await;
        let venue_id = tables.venues.next_id();
        let mut venue = Venue {
            venue_id,
            user_id: owner_id,
            venue_name: String::new(),
            address: String::new(),
            city: String::new(),
            province: String::new(),
            postal_code: String::new(),
            phone: String::new(),
            email: String::new(),
            open_time: None,
            close_time: None,
        };
        venue.apply(fields);
        tables.venues.rows.insert(venue_id, venue.clone());
        Ok(venue)
    }

    async fn find_venue(&self, venue_id: i64) -> AppResult<Option<Venue>> {
        Ok(self.tables.lock().await.venues.rows.get(&venue_id).cloned())
    }

    async fn list_venues(&self, owner_id: i64) -> AppResult<Vec<Venue>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .venues
            .rows
            .values()
            .filter(|v| v.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_venue(&self, venue: &Venue) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .venues
            .rows
            .get_mut(&venue.venue_id)
            .ok_or_else(|| not_found("Venue", venue.venue_id))?;
        *row = venue.clone();
        Ok(())
    }

    async fn delete_venue(&self, venue_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .venues
            .rows
            .remove(&venue_id)
            .is_some())
    }

    async fn insert_service(&self, owner_id: i64, fields: ServiceFields) -> AppResult<Service> {
        let mut tables = self.tables.lock().await;
        let service_id = tables.services.next_id();
        let mut service = Service {
            service_id,
            user_id: Some(owner_id),
            venue_id: None,
            service_name: String::new(),
            description: None,
        };
        service.apply(fields);
        tables.services.rows.insert(service_id, service.clone());
        Ok(service)
    }

    async fn find_service(&self, service_id: i64) -> AppResult<Option<Service>> {
        Ok(self
            .tables
            .lock()
            .await
            .services
            .rows
            .get(&service_id)
            .cloned())
    }

    async fn list_services(
        &self,
        owner_id: i64,
        venue_id: Option<i64>,
    ) -> AppResult<Vec<Service>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .services
            .rows
            .values()
            .filter(|s| s.is_owned_by(owner_id))
            .filter(|s| venue_id.map_or(true, |id| s.venue_id == Some(id)))
            .cloned()
            .collect())
    }

    async fn update_service(&self, service: &Service) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .services
            .rows
            .get_mut(&service.service_id)
            .ok_or_else(|| not_found("Service", service.service_id))?;
        *row = service.clone();
        Ok(())
    }

    async fn delete_service(&self, service_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .services
            .rows
            .remove(&service_id)
            .is_some())
    }

    async fn insert_counter(&self, owner_id: i64, fields: CounterFields) -> AppResult<Counter> {
        let mut tables = self.tables.lock().await;
        let counter_id = tables.counters.next_id();
        let mut counter = Counter {
            counter_id,
            venue_id: None,
            service_id: None,
            counter_name: String::new(),
            operator_name: String::new(),
            operator_nik: String::new(),
            open_time: fields.open_time,
            close_time: fields.close_time,
            is_vip: false,
            user_id: owner_id,
        };
        counter.apply(fields);
        tables.counters.rows.insert(counter_id, counter.clone());
        Ok(counter)
    }

    async fn find_counter(&self, counter_id: i64) -> AppResult<Option<Counter>> {
        Ok(self
            .tables
            .lock()
            .await
            .counters
            .rows
            .get(&counter_id)
            .cloned())
    }

    async fn list_counters(
        &self,
        owner_id: i64,
        venue_id: Option<i64>,
    ) -> AppResult<Vec<Counter>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .counters
            .rows
            .values()
            .filter(|c| c.user_id == owner_id)
            .filter(|c| venue_id.map_or(true, |id| c.venue_id == Some(id)))
            .cloned()
            .collect())
    }

    async fn update_counter(&self, counter: &Counter) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .counters
            .rows
            .get_mut(&counter.counter_id)
            .ok_or_else(|| not_found("Counter", counter.counter_id))?;
        *row = counter.clone();
        Ok(())
    }

    async fn delete_counter(&self, counter_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .counters
            .rows
            .remove(&counter_id)
            .is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        let users = &mut tables.users;

        if users
            .rows
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(
                "username or email already registered".to_string(),
            ));
        }

        let user_id = users.next_id();
        let row = User {
            user_id,
            company_name: user.company_name,
            role: user.role,
            username: user.username,
            password_hash: user.password_hash,
            email: user.email,
            owner_id: user.owner_id,
        };
        users.rows.insert(user_id, row.clone());
        Ok(row)
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.tables.lock().await.users.rows.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users_for_admin(&self, admin_id: i64) -> AppResult<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .rows
            .values()
            .filter(|u| u.belongs_to(admin_id))
            .cloned()
            .collect())
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.users.rows.values().any(|u| {
            u.user_id != user.user_id && (u.username == user.username || u.email == user.email)
        }) {
            return Err(AppError::Conflict(
                "username or email already registered".to_string(),
            ));
        }
        let row = tables
            .users
            .rows
            .get_mut(&user.user_id)
            .ok_or_else(|| not_found("User", user.user_id))?;
        *row = user.clone();
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .rows
            .remove(&user_id)
            .is_some())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn insert_assignment(&self, assignment: NewAssignment) -> AppResult<UserCounterMap> {
        let mut tables = self.tables.lock().await;
        let id = tables.assignments.next_id();
        let row = UserCounterMap {
            user_counter_map_id: id,
            user_id: assignment.user_id,
            counter_id: assignment.counter_id,
            assigned_at: Utc::now(),
            owner_id: assignment.owner_id,
        };
        tables.assignments.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn find_assignment(&self, id: i64) -> AppResult<Option<UserCounterMap>> {
        Ok(self
            .tables
            .lock()
            .await
            .assignments
            .rows
            .get(&id)
            .cloned())
    }

    async fn list_assignments(&self, owner_id: i64) -> AppResult<Vec<UserCounterMap>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .assignments
            .rows
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_assignment(&self, assignment: &UserCounterMap) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .assignments
            .rows
            .get_mut(&assignment.user_counter_map_id)
            .ok_or_else(|| not_found("Assignment", assignment.user_counter_map_id))?;
        *row = assignment.clone();
        Ok(())
    }

    async fn delete_assignment(&self, id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .assignments
            .rows
            .remove(&id)
            .is_some())
    }

    async fn first_assignment_for_counter(
        &self,
        counter_id: i64,
    ) -> AppResult<Option<UserCounterMap>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .assignments
            .rows
            .values()
            .find(|a| a.counter_id == counter_id)
            .cloned())
    }

    async fn first_assignment_for_user(
        &self,
        user_id: i64,
    ) -> AppResult<Option<UserCounterMap>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .assignments
            .rows
            .values()
            .find(|a| a.user_id == user_id)
            .cloned())
    }
}
