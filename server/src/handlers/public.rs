use axum::extract::State;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::auth::Principal;
use crate::models::Ticket;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::{optional_id, ApiPath, ApiQuery};
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct ServiceQueueQuery {
    #[serde(default, deserialize_with = "optional_id")]
    pub venue_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub service_id: Option<i64>,
}

#[derive(Serialize)]
struct ServiceQueue {
    tickets: Vec<Ticket>,
}

/// Looks a ticket up by the token printed on it. No authentication.
pub async fn my_ticket(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
) -> AppResult<Response> {
    let view = state.tickets.public_view(&token).await?;
    Ok(success(view, "Ticket retrieved successfully"))
}

pub async fn waiting_tickets(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<ServiceQueueQuery>,
) -> AppResult<Response> {
    let venue_id = query
        .venue_id
        .ok_or_else(|| AppError::ValidationError("Invalid venue_id".to_string()))?;
    let service_id = query
        .service_id
        .ok_or_else(|| AppError::ValidationError("Invalid service_id".to_string()))?;

    let tickets = state
        .tickets
        .service_queue(&principal, venue_id, service_id)
        .await?;
    Ok(success(
        ServiceQueue { tickets },
        "Tickets retrieved successfully",
    ))
}
