use axum::extract::State;
use axum::response::Response;

use crate::auth::Principal;
use crate::engine::assignments::AssignmentRequest;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{ApiJson, ApiPath};
use crate::utils::response::{created, empty_success, success};

pub async fn list_mappings(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Response> {
    let mappings = state.assignments.list(&principal).await?;
    Ok(success(mappings, "Mappings retrieved successfully"))
}

pub async fn get_mapping(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Response> {
    let mapping = state.assignments.get(&principal, id).await?;
    Ok(success(mapping, "Mapping retrieved successfully"))
}

pub async fn create_mapping(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<AssignmentRequest>,
) -> AppResult<Response> {
    let mapping = state.assignments.create(&principal, req).await?;
    Ok(created(mapping, "Mapping created successfully"))
}

pub async fn update_mapping(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AssignmentRequest>,
) -> AppResult<Response> {
    let mapping = state.assignments.update(&principal, id, req).await?;
    Ok(success(mapping, "Mapping updated successfully"))
}

pub async fn delete_mapping(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Response> {
    state.assignments.delete(&principal, id).await?;
    Ok(empty_success("Mapping deleted successfully"))
}

pub async fn user_by_counter(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(counter_id): ApiPath<i64>,
) -> AppResult<Response> {
    let assigned = state
        .assignments
        .user_for_counter(&principal, counter_id)
        .await?;
    Ok(success(assigned, "User retrieved successfully"))
}

pub async fn counter_by_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(user_id): ApiPath<i64>,
) -> AppResult<Response> {
    let assigned = state
        .assignments
        .counter_for_user(&principal, user_id)
        .await?;
    Ok(success(assigned, "Counter retrieved successfully"))
}
