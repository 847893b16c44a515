use axum::extract::State;
use axum::response::Response;

use crate::auth::Principal;
use crate::models::CounterInput;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{ApiJson, ApiPath};
use crate::utils::response::{created, empty_success, success};

pub async fn list_counters(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Response> {
    let counters = state.catalog.list_counters(&principal, None).await?;
    Ok(success(counters, "Counters retrieved successfully"))
}

pub async fn list_counters_by_venue(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(venue_id): ApiPath<i64>,
) -> AppResult<Response> {
    let counters = state
        .catalog
        .list_counters(&principal, Some(venue_id))
        .await?;
    Ok(success(counters, "Counters retrieved successfully"))
}

pub async fn create_counter(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(input): ApiJson<CounterInput>,
) -> AppResult<Response> {
    let counter = state.catalog.create_counter(&principal, input).await?;
    Ok(created(counter, "Counter created successfully"))
}

pub async fn get_counter(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(counter_id): ApiPath<i64>,
) -> AppResult<Response> {
    let counter = state.catalog.get_counter(&principal, counter_id).await?;
    Ok(success(counter, "Counter retrieved successfully"))
}

pub async fn update_counter(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(counter_id): ApiPath<i64>,
    ApiJson(input): ApiJson<CounterInput>,
) -> AppResult<Response> {
    let counter = state
        .catalog
        .update_counter(&principal, counter_id, input)
        .await?;
    Ok(success(counter, "Counter updated successfully"))
}

pub async fn delete_counter(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(counter_id): ApiPath<i64>,
) -> AppResult<Response> {
    state.catalog.delete_counter(&principal, counter_id).await?;
    Ok(empty_success("Counter deleted successfully"))
}
