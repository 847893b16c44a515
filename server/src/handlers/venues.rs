use axum::extract::State;
use axum::response::Response;

use crate::auth::Principal;
use crate::models::VenueInput;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{ApiJson, ApiPath};
use crate::utils::response::{created, empty_success, success};

pub async fn list_venues(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Response> {
    let venues = state.catalog.list_venues(&principal).await?;
    Ok(success(venues, "Venues retrieved successfully"))
}

pub async fn create_venue(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(input): ApiJson<VenueInput>,
) -> AppResult<Response> {
    let venue = state.catalog.create_venue(&principal, input).await?;
    Ok(created(venue, "Venue created successfully"))
}

pub async fn get_venue(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(venue_id): ApiPath<i64>,
) -> AppResult<Response> {
    let venue = state.catalog.get_venue(&principal, venue_id).await?;
    Ok(success(venue, "Venue retrieved successfully"))
}

pub async fn update_venue(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(venue_id): ApiPath<i64>,
    ApiJson(input): ApiJson<VenueInput>,
) -> AppResult<Response> {
    let venue = state.catalog.update_venue(&principal, venue_id, input).await?;
    Ok(success(venue, "Venue updated successfully"))
}

pub async fn delete_venue(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(venue_id): ApiPath<i64>,
) -> AppResult<Response> {
    state.catalog.delete_venue(&principal, venue_id).await?;
    Ok(empty_success("Venue deleted successfully"))
}
