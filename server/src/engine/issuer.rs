use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::auth::Principal;
use crate::engine::AccessGate;
use crate::models::{NewTicket, Ticket};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};
use crate::utils::token::generate_ticket_token;
use crate::utils::validate::{email, required};

#[derive(Debug, Clone, Deserialize)]
pub struct IssueTicketRequest {
    pub venue_id: Option<i64>,
    pub service_id: Option<i64>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
}

#[derive(Clone)]
pub struct TicketIssuer {
    store: Arc<dyn Store>,
    gate: AccessGate,
}

impl TicketIssuer {
    pub fn new(store: Arc<dyn Store>, gate: AccessGate) -> Self {
        Self { store, gate }
    }

    /// Numbers and persists a new waiting ticket for a service the caller
    /// owns.
    pub async fn issue(&self, principal: &Principal, req: IssueTicketRequest) -> AppResult<Ticket> {
        let venue_id = req
            .venue_id
            .ok_or_else(|| AppError::ValidationError("venue_id is required".to_string()))?;
        let service_id = req
            .service_id
            .ok_or_else(|| AppError::ValidationError("service_id is required".to_string()))?;
        let customer_name = required(&req.customer_name, "customer_name")?;
        let customer_email = email(&req.customer_email, "customer_email")?;
        let customer_phone = required(&req.customer_phone, "customer_phone")?;

        let scope = principal.scope()?;
        let service = self.store.find_service(service_id).await?;
        if !service.is_some_and(|s| s.is_owned_by(scope.owner_id)) {
            return Err(AppError::Forbidden(
                "Service does not belong to your account".to_string(),
            ));
        }
        self.gate.venue(scope, venue_id).await?;

        let ticket = self
            .store
            .insert_ticket(NewTicket {
                user_id: scope.owner_id,
                service_id,
                venue_id,
                customer_name,
                customer_email,
                customer_phone,
                token: generate_ticket_token()?,
            })
            .await?;

        info!(
            ticket_id = ticket.ticket_id,
            service_id,
            queue_number = %ticket.queue_number,
            "Ticket issued"
        );
        Ok(ticket)
    }
}
