//! Queue engine: the components every handler delegates to.
//!
//! Each component is built from the shared `Arc<dyn Store>` and takes the
//! caller's [`Principal`](crate::auth::Principal) explicitly on every call.

pub mod access;
pub mod assignments;
pub mod catalog;
pub mod display;
pub mod issuer;
pub mod lifecycle;
pub mod statistics;
pub mod users;

pub use access::AccessGate;
pub use assignments::AssignmentDesk;
pub use catalog::Catalog;
pub use display::DisplayBoard;
pub use issuer::TicketIssuer;
pub use lifecycle::TicketLifecycle;
pub use statistics::StatisticsService;
pub use users::UserDirectory;
