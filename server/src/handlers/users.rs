use axum::extract::State;
use axum::response::Response;

use crate::auth::Principal;
use crate::engine::users::{CreateUserRequest, UpdateUserRequest};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{ApiJson, ApiPath};
use crate::utils::response::{created, empty_success, success};

pub async fn list_users(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Response> {
    let users = state.users.list(&principal).await?;
    Ok(success(users, "Users retrieved successfully"))
}

pub async fn create_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> AppResult<Response> {
    let user = state.users.create(&principal, req).await?;
    Ok(created(user, "User created successfully"))
}

pub async fn get_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(user_id): ApiPath<i64>,
) -> AppResult<Response> {
    let user = state.users.get(&principal, user_id).await?;
    Ok(success(user, "User retrieved successfully"))
}

pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> AppResult<Response> {
    let user = state.users.update(&principal, user_id, req).await?;
    Ok(success(user, "User updated successfully"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(user_id): ApiPath<i64>,
) -> AppResult<Response> {
    state.users.delete(&principal, user_id).await?;
    Ok(empty_success("User deleted successfully"))
}
