use axum::extract::State;
use axum::response::Response;

use crate::auth::Principal;
use crate::models::StatisticsFilter;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::ApiJson;
use crate::utils::response::success;

pub async fn active_queues(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(filter): ApiJson<StatisticsFilter>,
) -> AppResult<Response> {
    let rows = state.statistics.active_queues(&principal, filter).await?;
    Ok(success(rows, "Active queues retrieved successfully"))
}

pub async fn average_wait_time(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(filter): ApiJson<StatisticsFilter>,
) -> AppResult<Response> {
    let rows = state.statistics.average_wait_time(&principal, filter).await?;
    Ok(success(rows, "Average wait time retrieved successfully"))
}

pub async fn total_served(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(filter): ApiJson<StatisticsFilter>,
) -> AppResult<Response> {
    let rows = state.statistics.total_served(&principal, filter).await?;
    Ok(success(rows, "Total served retrieved successfully"))
}
