use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::{AppError, AppResult};

/// Pending ticket labels for a counter, served front to back.
///
/// Persisted as a JSON array in a text column; [`NextTickets::encode`] and
/// the `TryFrom<String>` impl are the only crossing points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NextTickets(VecDeque<String>);

impl NextTickets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(raw: &str) -> AppResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(raw).map_err(|e| {
            AppError::InternalServerError(format!("failed to parse next_tickets: {e}"))
        })
    }

    pub fn encode(&self) -> AppResult<String> {
        serde_json::to_string(self).map_err(|e| {
            AppError::InternalServerError(format!("failed to update next_tickets: {e}"))
        })
    }

    pub fn push(&mut self, label: impl Into<String>) {
        self.0.push_back(label.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for NextTickets {
    fn from(labels: Vec<String>) -> Self {
        Self(labels.into())
    }
}

impl TryFrom<String> for NextTickets {
    type Error = AppError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        NextTickets::decode(&raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueDisplay {
    pub display_id: i64,
    pub venue_id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub counter_id: i64,
    pub current_ticket: String,
    #[sqlx(try_from = "String")]
    pub next_tickets: NextTickets,
    pub updated_at: DateTime<Utc>,
}

impl QueueDisplay {
    /// Moves the head of `next_tickets` into `current_ticket`.
    pub fn assign_next(&mut self) -> AppResult<&str> {
        let next = self.next_tickets.pop().ok_or(AppError::NoTicketsAvailable)?;
        self.current_ticket = next;
        Ok(&self.current_ticket)
    }

    pub fn clear(&mut self) {
        self.current_ticket.clear();
        self.next_tickets = NextTickets::new();
    }
}

#[derive(Debug, Clone)]
pub struct NewDisplay {
    pub venue_id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub counter_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayFilter {
    pub owner_id: Option<i64>,
    pub venue_id: Option<i64>,
    pub service_id: Option<i64>,
    pub counter_id: Option<i64>,
}

impl DisplayFilter {
    pub fn matches(&self, display: &QueueDisplay) -> bool {
        self.owner_id.map_or(true, |id| display.user_id == id)
            && self.venue_id.map_or(true, |id| display.venue_id == id)
            && self.service_id.map_or(true, |id| display.service_id == id)
            && self.counter_id.map_or(true, |id| display.counter_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(next: &[&str]) -> QueueDisplay {
        QueueDisplay {
            display_id: 1,
            venue_id: 1,
            user_id: 1,
            service_id: 2,
            counter_id: 3,
            current_ticket: String::new(),
            next_tickets: NextTickets::from(next.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_assign_next_pops_head_in_fifo_order() {
        let mut d = display(&["A1", "A2"]);
        assert_eq!(d.assign_next().unwrap(), "A1");
        assert_eq!(d.current_ticket, "A1");
        assert_eq!(d.next_tickets, NextTickets::from(vec!["A2".to_string()]));

        d.assign_next().unwrap();
        assert_eq!(d.current_ticket, "A2");
        assert!(d.next_tickets.is_empty());
        assert!(matches!(d.assign_next(), Err(AppError::NoTicketsAvailable)));
        assert_eq!(d.current_ticket, "A2");
    }

    #[test]
    fn test_next_tickets_text_encoding() {
        let tickets = NextTickets::from(vec!["7".to_string(), "8".to_string()]);
        let raw = tickets.encode().unwrap();
        assert_eq!(raw, r#"["7","8"]"#);
        assert_eq!(NextTickets::decode("").unwrap(), NextTickets::new());
        assert!(matches!(
            NextTickets::decode("not json"),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[test]
    fn test_clear_empties_both_fields() {
        let mut d = display(&["1"]);
        d.current_ticket = "0".into();
        d.clear();
        assert!(d.current_ticket.is_empty());
        assert!(d.next_tickets.is_empty());
    }
}
