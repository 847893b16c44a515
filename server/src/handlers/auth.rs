use axum::extract::State;
use axum::response::Response;

use crate::auth::Principal;
use crate::engine::users::{LoginRequest, RegisterRequest};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::ApiJson;
use crate::utils::response::{created, empty_success, success};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AppResult<Response> {
    let user = state.users.register(req).await?;
    Ok(created(user, "User registered successfully"))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let session = state.users.login(req).await?;
    Ok(success(session, "Login successful"))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(_principal: Principal) -> Response {
    empty_success("Logout successful")
}

pub async fn me(State(state): State<AppState>, principal: Principal) -> AppResult<Response> {
    let user = state.users.me(&principal).await?;
    Ok(success(user, "Profile retrieved successfully"))
}
