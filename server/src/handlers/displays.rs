use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::auth::Principal;
use crate::engine::display::{
    CreateDisplayRequest, DisplayQuery, EnqueueRequest, ReplaceDisplayRequest,
};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::response::{created, success};

#[derive(Serialize)]
struct ResetSummary {
    cleared: u64,
}

pub async fn create_display(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<CreateDisplayRequest>,
) -> AppResult<Response> {
    let display = state.displays.create(&principal, req).await?;
    Ok(created(display, "Queue display created successfully"))
}

pub async fn list_displays(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<DisplayQuery>,
) -> AppResult<Response> {
    let displays = state.displays.list(&principal, &query).await?;
    Ok(success(displays, "Queue displays retrieved successfully"))
}

pub async fn get_display(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(counter_id): ApiPath<i64>,
) -> AppResult<Response> {
    let display = state.displays.get(&principal, counter_id).await?;
    Ok(success(display, "Queue display retrieved successfully"))
}

pub async fn replace_display(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(counter_id): ApiPath<i64>,
    ApiJson(req): ApiJson<ReplaceDisplayRequest>,
) -> AppResult<Response> {
    let display = state.displays.replace(&principal, counter_id, req).await?;
    Ok(success(display, "Queue display updated successfully"))
}

pub async fn enqueue_ticket(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(counter_id): ApiPath<i64>,
    ApiJson(req): ApiJson<EnqueueRequest>,
) -> AppResult<Response> {
    let display = state.displays.enqueue(&principal, counter_id, req).await?;
    Ok(success(display, "Ticket added to queue display"))
}

pub async fn assign_next_ticket(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(counter_id): ApiPath<i64>,
) -> AppResult<Response> {
    let display = state.displays.assign_next(&principal, counter_id).await?;
    Ok(success(display, "Next ticket assigned successfully"))
}

pub async fn next_counter(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<DisplayQuery>,
) -> AppResult<Response> {
    let displays = state.displays.next_counter(&principal, &query).await?;
    Ok(success(displays, "Counters retrieved successfully"))
}

pub async fn current_ticket(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<DisplayQuery>,
) -> AppResult<Response> {
    let display = state.displays.current_ticket(&principal, &query).await?;
    Ok(success(display, "Current ticket retrieved successfully"))
}

pub async fn reset_displays(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Response> {
    let cleared = state.displays.reset(&principal).await?;
    Ok(success(
        ResetSummary { cleared },
        "Queue displays reset successfully",
    ))
}

pub async fn display_analytics(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<DisplayQuery>,
) -> AppResult<Response> {
    let analytics = state.displays.analytics(&principal, &query).await?;
    Ok(success(analytics, "Analytics retrieved successfully"))
}
