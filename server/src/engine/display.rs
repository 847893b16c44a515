//! Per-counter display boards: the ticket being served and the labels
//! waiting behind it.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::Principal;
use crate::engine::statistics::display_analytics;
use crate::engine::AccessGate;
use crate::models::{
    DisplayAnalytics, DisplayFilter, NewDisplay, NextTickets, QueueDisplay, Role, TicketQuery,
};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::{blank_as_none, optional_id};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDisplayRequest {
    pub venue_id: Option<i64>,
    pub service_id: Option<i64>,
    pub counter_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceDisplayRequest {
    #[serde(default)]
    pub current_ticket: String,
    #[serde(default)]
    pub next_tickets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnqueueRequest {
    pub ticket: String,
}

/// Optional narrowing filters shared by the display listings. Blank or
/// zero ids mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayQuery {
    #[serde(default, deserialize_with = "optional_id")]
    pub venue_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub service_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub counter_id: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date: Option<NaiveDate>,
}

fn require_id(value: Option<i64>, field: &str) -> AppResult<i64> {
    value.ok_or_else(|| AppError::ValidationError(format!("{field} is required")))
}

#[derive(Clone)]
pub struct DisplayBoard {
    store: Arc<dyn Store>,
    gate: AccessGate,
}

impl DisplayBoard {
    pub fn new(store: Arc<dyn Store>, gate: AccessGate) -> Self {
        Self { store, gate }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        req: CreateDisplayRequest,
    ) -> AppResult<QueueDisplay> {
        let venue_id = require_id(req.venue_id, "venue_id")?;
        let service_id = require_id(req.service_id, "service_id")?;
        let counter_id = require_id(req.counter_id, "counter_id")?;

        let scope = principal.scope()?;
        self.gate.counter(scope, counter_id).await?;
        self.gate.service(scope, service_id).await?;
        self.gate.venue(scope, venue_id).await?;

        let display = self
            .store
            .insert_display(NewDisplay {
                venue_id,
                user_id: scope.owner_id,
                service_id,
                counter_id,
            })
            .await?;
        info!(counter_id, "Queue display created");
        Ok(display)
    }

    pub async fn get(&self, principal: &Principal, counter_id: i64) -> AppResult<QueueDisplay> {
        self.gate.display(principal.scope()?, counter_id).await
    }

    pub async fn replace(
        &self,
        principal: &Principal,
        counter_id: i64,
        req: ReplaceDisplayRequest,
    ) -> AppResult<QueueDisplay> {
        self.gate.display(principal.scope()?, counter_id).await?;
        self.store
            .mutate_display(
                counter_id,
                Box::new(move |display: &mut QueueDisplay| {
                    display.current_ticket = req.current_ticket;
                    display.next_tickets = NextTickets::from(req.next_tickets);
                    Ok(())
                }),
            )
            .await
    }

    pub async fn enqueue(
        &self,
        principal: &Principal,
        counter_id: i64,
        req: EnqueueRequest,
    ) -> AppResult<QueueDisplay> {
        let label = req.ticket.trim().to_string();
        if label.is_empty() {
            return Err(AppError::ValidationError("ticket is required".to_string()));
        }
        self.gate.display(principal.scope()?, counter_id).await?;
        self.store
            .mutate_display(
                counter_id,
                Box::new(move |display: &mut QueueDisplay| {
                    display.next_tickets.push(label);
                    Ok(())
                }),
            )
            .await
    }

    /// Pops the head of the pending list into `current_ticket` while the
    /// display row is held exclusively.
    pub async fn assign_next(
        &self,
        principal: &Principal,
        counter_id: i64,
    ) -> AppResult<QueueDisplay> {
        self.gate.display(principal.scope()?, counter_id).await?;
        let board = self
            .store
            .mutate_display(
                counter_id,
                Box::new(|board: &mut QueueDisplay| board.assign_next().map(|_| ())),
            )
            .await?;
        info!(
            counter_id,
            current_ticket = %board.current_ticket,
            remaining = board.next_tickets.len(),
            "Next ticket assigned"
        );
        Ok(board)
    }

    pub async fn list(
        &self,
        principal: &Principal,
        query: &DisplayQuery,
    ) -> AppResult<Vec<QueueDisplay>> {
        let scope = principal.scope()?;
        self.store
            .list_displays(&DisplayFilter {
                owner_id: Some(scope.owner_id),
                venue_id: query.venue_id,
                service_id: query.service_id,
                counter_id: query.counter_id,
            })
            .await
    }

    /// Every display serving the venue/service pair. No single counter is
    /// picked; the caller applies its own policy.
    pub async fn next_counter(
        &self,
        principal: &Principal,
        query: &DisplayQuery,
    ) -> AppResult<Vec<QueueDisplay>> {
        let narrowed = DisplayQuery {
            counter_id: None,
            ..query.clone()
        };
        self.list(principal, &narrowed).await
    }

    pub async fn current_ticket(
        &self,
        principal: &Principal,
        query: &DisplayQuery,
    ) -> AppResult<QueueDisplay> {
        require_id(query.counter_id, "counter_id")?;
        self.list(principal, query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Queue display not found".to_string()))
    }

    /// A super admin clears every tenant's displays; an admin clears its
    /// own. Operators may not reset.
    pub async fn reset(&self, principal: &Principal) -> AppResult<u64> {
        let owner_id = match principal.role {
            Role::SuperAdmin => None,
            Role::Admin => Some(principal.scope()?.owner_id),
            Role::Operator => {
                warn!(user_id = principal.user_id, "Display reset refused");
                return Err(AppError::Forbidden(
                    "Only an admin can reset queue displays".to_string(),
                ));
            }
        };
        let cleared = self.store.reset_displays(owner_id).await?;
        info!(
            cleared,
            user_id = principal.user_id,
            tenant = ?owner_id,
            "Queue displays reset"
        );
        Ok(cleared)
    }

    /// Ticket counters for one UTC calendar day, today when no date is given.
    pub async fn analytics(
        &self,
        principal: &Principal,
        query: &DisplayQuery,
    ) -> AppResult<DisplayAnalytics> {
        let scope = principal.scope()?;
        let day = query.date.unwrap_or_else(|| Utc::now().date_naive());
        let tickets = self
            .store
            .list_tickets(&TicketQuery {
                owner_id: Some(scope.owner_id),
                venue_id: query.venue_id,
                service_id: query.service_id,
                created_on: Some(day),
                ..TicketQuery::default()
            })
            .await?;
        Ok(display_analytics(&tickets))
    }
}
