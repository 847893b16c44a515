use axum::extract::State;
use axum::response::Response;

use crate::auth::Principal;
use crate::models::ServiceInput;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{ApiJson, ApiPath};
use crate::utils::response::{created, empty_success, success};

pub async fn list_services(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Response> {
    let services = state.catalog.list_services(&principal, None).await?;
    Ok(success(services, "Services retrieved successfully"))
}

pub async fn list_services_by_venue(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(venue_id): ApiPath<i64>,
) -> AppResult<Response> {
    let services = state
        .catalog
        .list_services(&principal, Some(venue_id))
        .await?;
    Ok(success(services, "Services retrieved successfully"))
}

pub async fn create_service(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(input): ApiJson<ServiceInput>,
) -> AppResult<Response> {
    let service = state.catalog.create_service(&principal, input).await?;
    Ok(created(service, "Service created successfully"))
}

pub async fn get_service(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(service_id): ApiPath<i64>,
) -> AppResult<Response> {
    let service = state.catalog.get_service(&principal, service_id).await?;
    Ok(success(service, "Service retrieved successfully"))
}

pub async fn update_service(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(service_id): ApiPath<i64>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> AppResult<Response> {
    let service = state
        .catalog
        .update_service(&principal, service_id, input)
        .await?;
    Ok(success(service, "Service updated successfully"))
}

pub async fn delete_service(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(service_id): ApiPath<i64>,
) -> AppResult<Response> {
    state.catalog.delete_service(&principal, service_id).await?;
    Ok(empty_success("Service deleted successfully"))
}
