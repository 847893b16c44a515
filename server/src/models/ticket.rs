use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Waiting,
    Called,
    Skipped,
    Completed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::Called => "called",
            TicketStatus::Skipped => "skipped",
            TicketStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Skipped | TicketStatus::Completed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "waiting" => Ok(TicketStatus::Waiting),
            "called" => Ok(TicketStatus::Called),
            "skipped" => Ok(TicketStatus::Skipped),
            "completed" => Ok(TicketStatus::Completed),
            other => Err(AppError::InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TicketStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub ticket_id: i64,
    pub user_id: i64,
    pub service_id: Option<i64>,
    pub counter_id: Option<i64>,
    pub venue_id: Option<i64>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub photo_url: String,
    pub queue_number: String,
    pub token: String,
    #[sqlx(try_from = "String")]
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub skipped_at: Option<DateTime<Utc>>,
    pub operator_id: Option<i64>,
}

impl Ticket {
    pub fn numeric_queue_number(&self) -> Option<i64> {
        parse_queue_number(&self.queue_number)
    }
}

/// A ticket before the store has assigned its id and queue number.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub user_id: i64,
    pub service_id: i64,
    pub venue_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub token: String,
}

/// Filters for ticket listings. `None` leaves a column unconstrained.
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
    pub owner_id: Option<i64>,
    pub statuses: Vec<TicketStatus>,
    pub venue_id: Option<i64>,
    pub service_id: Option<i64>,
    pub counter_id: Option<i64>,
    pub created_on: Option<NaiveDate>,
}

impl TicketQuery {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.owner_id.map_or(true, |id| ticket.user_id == id)
            && (self.statuses.is_empty() || self.statuses.contains(&ticket.status))
            && self.venue_id.map_or(true, |id| ticket.venue_id == Some(id))
            && self.service_id.map_or(true, |id| ticket.service_id == Some(id))
            && self.counter_id.map_or(true, |id| ticket.counter_id == Some(id))
            && self
                .created_on
                .map_or(true, |day| ticket.created_at.date_naive() == day)
    }
}

/// Queue numbers are persisted as text but ordered numerically.
pub fn parse_queue_number(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

/// Next number in a service's queue given the highest one issued so far.
pub fn next_queue_number(last: Option<i64>) -> i64 {
    last.map_or(1, |n| n + 1)
}

/// Ascending by numeric queue number, unparsable numbers last.
pub fn sort_by_queue_number(tickets: &mut [Ticket]) {
    tickets.sort_by_key(|t| (t.numeric_queue_number().unwrap_or(i64::MAX), t.ticket_id));
}
