use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;

use crate::auth::Principal;
use crate::engine::issuer::IssueTicketRequest;
use crate::engine::lifecycle::{TransitionRequest, UpdateTicketRequest};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct TicketListQuery {
    pub status: Option<String>,
}

pub async fn list_tickets(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<TicketListQuery>,
) -> AppResult<Response> {
    let tickets = state
        .tickets
        .list(&principal, query.status.as_deref())
        .await?;
    Ok(success(tickets, "Tickets retrieved successfully"))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<IssueTicketRequest>,
) -> AppResult<Response> {
    let ticket = state.issuer.issue(&principal, req).await?;
    Ok(created(ticket, "Ticket created successfully"))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(ticket_id): ApiPath<i64>,
) -> AppResult<Response> {
    let ticket = state.tickets.get(&principal, ticket_id).await?;
    Ok(success(ticket, "Ticket retrieved successfully"))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(ticket_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateTicketRequest>,
) -> AppResult<Response> {
    let ticket = state.tickets.update(&principal, ticket_id, req).await?;
    Ok(success(ticket, "Ticket updated successfully"))
}

pub async fn update_ticket_status(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(ticket_id): ApiPath<i64>,
    ApiJson(req): ApiJson<TransitionRequest>,
) -> AppResult<Response> {
    let ticket = state.tickets.transition(&principal, ticket_id, req).await?;
    Ok(success(ticket, "Ticket status updated successfully"))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(ticket_id): ApiPath<i64>,
) -> AppResult<Response> {
    state.tickets.delete(&principal, ticket_id).await?;
    Ok(empty_success("Ticket deleted successfully"))
}
