//! Ticket state machine and the ticket read paths.
//!
//! ```text
//! waiting ──► called ──► completed
//!    │           │
//!    └───────────┴─────► skipped
//! ```
//!
//! Re-applying the current status is a no-op; every other pair is rejected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Principal;
use crate::engine::{AccessGate, StatisticsService};
use crate::models::{Ticket, TicketQuery, TicketStatus};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

/// Body of `PUT /queue-tickets/:id/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
    pub operator_id: Option<i64>,
    pub counter_id: Option<i64>,
}

/// Body of `PUT /queue-tickets/:id`. Only these three columns are ever
/// written by a full-record update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: String,
    pub called_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicTicketView {
    pub ticket: Ticket,
    pub service_name: String,
    pub venue_name: String,
    /// `None` until the service has completed at least one ticket.
    pub average_queue_time_minutes: Option<i64>,
}

/// Returns `Ok(false)` for a same-status no-op.
pub fn check_transition(from: TicketStatus, to: TicketStatus) -> AppResult<bool> {
    use TicketStatus::*;
    match (from, to) {
        _ if from == to => Ok(false),
        (Waiting, Called) | (Waiting, Skipped) | (Called, Completed) | (Called, Skipped) => Ok(true),
        _ => Err(AppError::Conflict(format!(
            "invalid transition from {from} to {to}"
        ))),
    }
}

fn stamp_entry(ticket: &mut Ticket, status: TicketStatus, now: DateTime<Utc>) {
    let slot = match status {
        TicketStatus::Waiting => return,
        TicketStatus::Called => &mut ticket.called_at,
        TicketStatus::Completed => &mut ticket.completed_at,
        TicketStatus::Skipped => &mut ticket.skipped_at,
    };
    slot.get_or_insert(now);
}

/// Moves `ticket` to `to`, stamping the entry time and, when given, the
/// acting operator and counter.
pub fn apply_transition(
    ticket: &mut Ticket,
    to: TicketStatus,
    operator_id: Option<i64>,
    counter_id: Option<i64>,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    if !check_transition(ticket.status, to)? {
        return Ok(false);
    }
    ticket.status = to;
    stamp_entry(ticket, to, now);
    if let Some(id) = operator_id {
        ticket.operator_id = Some(id);
    }
    if let Some(id) = counter_id {
        ticket.counter_id = Some(id);
    }
    Ok(true)
}

fn checked_stamp(
    field: &str,
    current: Option<DateTime<Utc>>,
    proposed: DateTime<Utc>,
    created_at: DateTime<Utc>,
) -> AppResult<DateTime<Utc>> {
    let floor = current.unwrap_or(created_at).max(created_at);
    if proposed < floor {
        return Err(AppError::ValidationError(format!(
            "{field} cannot move backwards"
        )));
    }
    Ok(proposed)
}

/// The narrow full-record update: status plus the called/completed stamps.
/// `called_at` is only accepted when the ticket ends up called or completed,
/// `completed_at` only when it ends up completed.
pub fn apply_update(
    ticket: &mut Ticket,
    to: TicketStatus,
    called_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let changed = check_transition(ticket.status, to)?;

    if called_at.is_some() && !matches!(to, TicketStatus::Called | TicketStatus::Completed) {
        return Err(AppError::ValidationError(format!(
            "called_at cannot be set on a {to} ticket"
        )));
    }
    if completed_at.is_some() && to != TicketStatus::Completed {
        return Err(AppError::ValidationError(format!(
            "completed_at cannot be set on a {to} ticket"
        )));
    }

    let called = match called_at {
        Some(at) => Some(checked_stamp("called_at", ticket.called_at, at, ticket.created_at)?),
        None => ticket.called_at,
    };
    let completed = match completed_at {
        Some(at) => Some(checked_stamp(
            "completed_at",
            ticket.completed_at,
            at,
            ticket.created_at,
        )?),
        None => ticket.completed_at,
    };
    if let (Some(called), Some(completed)) = (called, completed) {
        if completed < called {
            return Err(AppError::ValidationError(
                "completed_at cannot precede called_at".to_string(),
            ));
        }
    }

    ticket.called_at = called;
    ticket.completed_at = completed;
    if changed {
        ticket.status = to;
        stamp_entry(ticket, to, now);
    }
    Ok(())
}

fn require_owner_or_admin(principal: &Principal, ticket: &Ticket) -> AppResult<()> {
    if ticket.user_id == principal.user_id || principal.is_admin() {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "Only the ticket owner or an admin can modify this ticket".to_string(),
        ))
    }
}

#[derive(Clone)]
pub struct TicketLifecycle {
    store: Arc<dyn Store>,
    gate: AccessGate,
    statistics: StatisticsService,
}

impl TicketLifecycle {
    pub fn new(store: Arc<dyn Store>, gate: AccessGate, statistics: StatisticsService) -> Self {
        Self {
            store,
            gate,
            statistics,
        }
    }

    pub async fn list(&self, principal: &Principal, status: Option<&str>) -> AppResult<Vec<Ticket>> {
        let scope = principal.scope()?;
        let statuses = match status {
            Some(raw) => vec![raw.parse::<TicketStatus>()?],
            None => Vec::new(),
        };
        self.store
            .list_tickets(&TicketQuery {
                owner_id: Some(scope.owner_id),
                statuses,
                ..TicketQuery::default()
            })
            .await
    }

    pub async fn get(&self, principal: &Principal, ticket_id: i64) -> AppResult<Ticket> {
        self.gate.ticket(principal.scope()?, ticket_id).await
    }

    pub async fn transition(
        &self,
        principal: &Principal,
        ticket_id: i64,
        req: TransitionRequest,
    ) -> AppResult<Ticket> {
        let to: TicketStatus = req.status.parse()?;
        let scope = principal.scope()?;
        self.gate.ticket(scope, ticket_id).await?;

        if let Some(counter_id) = req.counter_id {
            self.gate.counter(scope, counter_id).await?;
        }
        if let Some(operator_id) = req.operator_id.filter(|id| *id != principal.user_id) {
            self.gate.member(scope, operator_id).await?;
        }

        let (operator_id, counter_id) = (req.operator_id, req.counter_id);
        let ticket = self
            .store
            .mutate_ticket(
                ticket_id,
                Box::new(move |ticket: &mut Ticket| {
                    apply_transition(ticket, to, operator_id, counter_id, Utc::now()).map(|_| ())
                }),
            )
            .await?;

        info!(ticket_id, status = %ticket.status, "Ticket status updated");
        Ok(ticket)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        ticket_id: i64,
        req: UpdateTicketRequest,
    ) -> AppResult<Ticket> {
        let to: TicketStatus = req.status.parse()?;
        let current = self.gate.ticket(principal.scope()?, ticket_id).await?;
        require_owner_or_admin(principal, &current)?;

        self.store
            .mutate_ticket(
                ticket_id,
                Box::new(move |ticket: &mut Ticket| {
                    apply_update(ticket, to, req.called_at, req.completed_at, Utc::now())
                }),
            )
            .await
    }

    pub async fn delete(&self, principal: &Principal, ticket_id: i64) -> AppResult<()> {
        let current = self.gate.ticket(principal.scope()?, ticket_id).await?;
        require_owner_or_admin(principal, &current)?;
        if !self.store.delete_ticket(ticket_id).await? {
            return Err(AppError::NotFound(format!("Ticket {ticket_id} not found")));
        }
        info!(ticket_id, "Ticket deleted");
        Ok(())
    }

    /// Every ticket of a service at a venue, ascending by queue number.
    pub async fn service_queue(
        &self,
        principal: &Principal,
        venue_id: i64,
        service_id: i64,
    ) -> AppResult<Vec<Ticket>> {
        let scope = principal.scope()?;
        self.gate.service(scope, service_id).await?;
        self.store
            .list_tickets(&TicketQuery {
                owner_id: Some(scope.owner_id),
                venue_id: Some(venue_id),
                service_id: Some(service_id),
                ..TicketQuery::default()
            })
            .await
    }

    /// Unauthenticated lookup by the token printed on the ticket.
    pub async fn public_view(&self, token: &str) -> AppResult<PublicTicketView> {
        let ticket = self
            .store
            .find_ticket_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

        let (Some(service_id), Some(venue_id)) = (ticket.service_id, ticket.venue_id) else {
            return Err(AppError::NotFound(
                "Ticket is not attached to a service".to_string(),
            ));
        };
        let service = self
            .store
            .find_service(service_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {service_id} not found")))?;
        let venue = self
            .store
            .find_venue(venue_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Venue {venue_id} not found")))?;

        let average_queue_time_minutes = match self
            .statistics
            .average_queuing_time(venue_id, service_id)
            .await
        {
            Ok(avg) => Some(avg.num_minutes()),
            Err(AppError::NoCompletedTickets) => None,
            Err(e) => return Err(e),
        };

        Ok(PublicTicketView {
            ticket,
            service_name: service.service_name,
            venue_name: venue.venue_name,
            average_queue_time_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn waiting() -> Ticket {
        Ticket {
            ticket_id: 1,
            user_id: 1,
            service_id: Some(2),
            counter_id: None,
            venue_id: Some(1),
            customer_name: "Sari".into(),
            customer_email: "sari@example.com".into(),
            customer_phone: "0813".into(),
            photo_url: String::new(),
            queue_number: "1".into(),
            token: "Zx9Yw8Vu".into(),
            status: TicketStatus::Waiting,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            called_at: None,
            completed_at: None,
            skipped_at: None,
            operator_id: None,
        }
    }

    #[test]
    fn test_allowed_paths() {
        use TicketStatus::*;
        for (from, to) in [
            (Waiting, Called),
            (Waiting, Skipped),
            (Called, Completed),
            (Called, Skipped),
        ] {
            assert!(check_transition(from, to).unwrap(), "{from} -> {to}");
        }
    }

    #[test]
    fn test_rejected_paths() {
        use TicketStatus::*;
        for (from, to) in [
            (Waiting, Completed),
            (Called, Waiting),
            (Completed, Waiting),
            (Completed, Called),
            (Skipped, Called),
            (Completed, Skipped),
        ] {
            assert!(
                matches!(check_transition(from, to), Err(AppError::Conflict(_))),
                "{from} -> {to}"
            );
        }
    }

    #[test]
    fn test_call_then_complete_stamps_once() {
        let mut t = waiting();
        let t0 = t.created_at + Duration::minutes(3);
        assert!(apply_transition(&mut t, TicketStatus::Called, Some(9), Some(4), t0).unwrap());
        assert_eq!(t.called_at, Some(t0));
        assert_eq!(t.operator_id, Some(9));
        assert_eq!(t.counter_id, Some(4));

        let t1 = t0 + Duration::minutes(5);
        apply_transition(&mut t, TicketStatus::Completed, None, None, t1).unwrap();
        assert_eq!(t.status, TicketStatus::Completed);
        assert_eq!(t.completed_at, Some(t1));
        assert_eq!(t.operator_id, Some(9), "absent operator keeps previous stamp");

        let t2 = t1 + Duration::minutes(5);
        assert!(!apply_transition(&mut t, TicketStatus::Completed, Some(10), None, t2).unwrap());
        assert_eq!(t.completed_at, Some(t1));
        assert_eq!(t.operator_id, Some(9));
        assert_eq!(t.called_at, Some(t0));
    }

    #[test]
    fn test_waiting_to_waiting_is_a_no_op() {
        let mut t = waiting();
        assert!(!apply_transition(&mut t, TicketStatus::Waiting, Some(3), None, Utc::now()).unwrap());
        assert_eq!(t.operator_id, None);
        assert_eq!(t.called_at, None);
    }

    #[test]
    fn test_skip_from_waiting() {
        let mut t = waiting();
        let at = t.created_at + Duration::minutes(1);
        apply_transition(&mut t, TicketStatus::Skipped, None, None, at).unwrap();
        assert_eq!(t.skipped_at, Some(at));
        assert_eq!(t.called_at, None);
        assert!(apply_transition(&mut t, TicketStatus::Called, None, None, at).is_err());
    }

    #[test]
    fn test_narrow_update_respects_machine_and_clock() {
        let mut t = waiting();
        let called = t.created_at + Duration::minutes(2);
        apply_update(&mut t, TicketStatus::Called, Some(called), None, Utc::now()).unwrap();
        assert_eq!(t.status, TicketStatus::Called);
        assert_eq!(t.called_at, Some(called));

        let err = apply_update(
            &mut t,
            TicketStatus::Called,
            Some(called - Duration::minutes(1)),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        assert!(matches!(
            apply_update(&mut t, TicketStatus::Waiting, None, None, Utc::now()),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_narrow_update_only_stamps_reached_states() {
        let mut t = waiting();
        let later = t.created_at + Duration::hours(1);

        for (called, completed) in [(Some(later), None), (None, Some(later))] {
            let err = apply_update(&mut t, TicketStatus::Waiting, called, completed, Utc::now())
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
        assert_eq!(t.called_at, None);
        assert_eq!(t.completed_at, None);

        let err = apply_update(&mut t, TicketStatus::Called, None, Some(later), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let call_time = t.created_at + Duration::minutes(5);
        apply_transition(&mut t, TicketStatus::Called, None, None, call_time).unwrap();
        assert_eq!(t.called_at, Some(call_time));

        let err = apply_update(
            &mut t,
            TicketStatus::Completed,
            None,
            Some(call_time - Duration::minutes(1)),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = apply_update(
            &mut t,
            TicketStatus::Skipped,
            Some(call_time),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(t.status, TicketStatus::Called);

        let done = call_time + Duration::minutes(3);
        apply_update(&mut t, TicketStatus::Completed, None, Some(done), Utc::now()).unwrap();
        assert_eq!(t.status, TicketStatus::Completed);
        assert_eq!(t.completed_at, Some(done));
    }
}
