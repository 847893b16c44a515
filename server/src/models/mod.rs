pub mod assignment;
pub mod counter;
pub mod display;
pub mod service;
pub mod statistics;
pub mod ticket;
pub mod user;
pub mod venue;

pub use assignment::{NewAssignment, UserCounterMap};
pub use counter::{Counter, CounterFields, CounterInput};
pub use display::{DisplayFilter, NewDisplay, NextTickets, QueueDisplay};
pub use service::{Service, ServiceFields, ServiceInput};
pub use statistics::{
    ActiveQueues, AverageWaitTime, DisplayAnalytics, QueueGroup, StatisticsFilter, TotalServed,
};
pub use ticket::{NewTicket, Ticket, TicketQuery, TicketStatus};
pub use user::{NewUser, Role, User};
pub use venue::{Venue, VenueFields, VenueInput};
