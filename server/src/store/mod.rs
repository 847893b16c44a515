//! Persistence boundary.
//!
//! Engine components receive an `Arc<dyn Store>` at construction and never
//! reach for a process-wide handle. `PgStore` backs production;
//! `MemoryStore` serves development without a database and the tests.
//!
//! The `mutate_*` methods run the closure while the row is held
//! exclusively (`SELECT … FOR UPDATE` in Postgres, the store mutex in
//! memory), so read-modify-write sequences cannot lose updates.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{
    Counter, CounterFields, DisplayFilter, NewAssignment, NewDisplay, NewTicket, NewUser,
    QueueDisplay, Service, ServiceFields, Ticket, TicketQuery, User, UserCounterMap, Venue,
    VenueFields,
};
use crate::utils::error::AppResult;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type TicketMutation = Box<dyn FnOnce(&mut Ticket) -> AppResult<()> + Send>;
pub type DisplayMutation = Box<dyn FnOnce(&mut QueueDisplay) -> AppResult<()> + Send>;

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Inserts a ticket numbered one past the highest queue number of its
    /// service. Numbering and insert are atomic per service.
    async fn insert_ticket(&self, ticket: NewTicket) -> AppResult<Ticket>;
    async fn find_ticket(&self, ticket_id: i64) -> AppResult<Option<Ticket>>;
    async fn find_ticket_by_token(&self, token: &str) -> AppResult<Option<Ticket>>;
    /// Results are ordered by numeric queue number, then ticket id.
    async fn list_tickets(&self, query: &TicketQuery) -> AppResult<Vec<Ticket>>;
    async fn mutate_ticket(&self, ticket_id: i64, mutation: TicketMutation) -> AppResult<Ticket>;
    async fn delete_ticket(&self, ticket_id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait DisplayStore: Send + Sync {
    /// Fails with `Conflict` when the counter already has a display.
    async fn insert_display(&self, display: NewDisplay) -> AppResult<QueueDisplay>;
    async fn find_display(&self, counter_id: i64) -> AppResult<Option<QueueDisplay>>;
    async fn list_displays(&self, filter: &DisplayFilter) -> AppResult<Vec<QueueDisplay>>;
    async fn mutate_display(
        &self,
        counter_id: i64,
        mutation: DisplayMutation,
    ) -> AppResult<QueueDisplay>;
    /// Clears the displays of one owner, or of every owner when `owner_id`
    /// is `None`. Returns the number of rows touched.
    async fn reset_displays(&self, owner_id: Option<i64>) -> AppResult<u64>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_venue(&self, owner_id: i64, fields: VenueFields) -> AppResult<Venue>;
    async fn find_venue(&self, venue_id: i64) -> AppResult<Option<Venue>>;
    async fn list_venues(&self, owner_id: i64) -> AppResult<Vec<Venue>>;
    async fn update_venue(&self, venue: &Venue) -> AppResult<()>;
    async fn delete_venue(&self, venue_id: i64) -> AppResult<bool>;

    async fn insert_service(&self, owner_id: i64, fields: ServiceFields) -> AppResult<Service>;
    async fn find_service(&self, service_id: i64) -> AppResult<Option<Service>>;
    async fn list_services(&self, owner_id: i64, venue_id: Option<i64>)
        -> AppResult<Vec<Service>>;
    async fn update_service(&self, service: &Service) -> AppResult<()>;
    async fn delete_service(&self, service_id: i64) -> AppResult<bool>;

    async fn insert_counter(&self, owner_id: i64, fields: CounterFields) -> AppResult<Counter>;
    async fn find_counter(&self, counter_id: i64) -> AppResult<Option<Counter>>;
    async fn list_counters(&self, owner_id: i64, venue_id: Option<i64>)
        -> AppResult<Vec<Counter>>;
    async fn update_counter(&self, counter: &Counter) -> AppResult<()>;
    async fn delete_counter(&self, counter_id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` on a duplicate username or email.
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;
    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// The admin itself plus every user it owns.
    async fn list_users_for_admin(&self, admin_id: i64) -> AppResult<Vec<User>>;
    async fn update_user(&self, user: &User) -> AppResult<()>;
    async fn delete_user(&self, user_id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn insert_assignment(&self, assignment: NewAssignment) -> AppResult<UserCounterMap>;
    async fn find_assignment(&self, id: i64) -> AppResult<Option<UserCounterMap>>;
    async fn list_assignments(&self, owner_id: i64) -> AppResult<Vec<UserCounterMap>>;
    async fn update_assignment(&self, assignment: &UserCounterMap) -> AppResult<()>;
    async fn delete_assignment(&self, id: i64) -> AppResult<bool>;
    async fn first_assignment_for_counter(
        &self,
        counter_id: i64,
    ) -> AppResult<Option<UserCounterMap>>;
    async fn first_assignment_for_user(&self, user_id: i64)
        -> AppResult<Option<UserCounterMap>>;
}

pub trait Store: TicketStore + DisplayStore + CatalogStore + UserStore + AssignmentStore {}

impl<T> Store for T where T: TicketStore + DisplayStore + CatalogStore + UserStore + AssignmentStore
{}
