use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use crate::auth::Principal;
use crate::state::AppState;
use crate::utils::error::AppError;

#[axum::async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Authorization header required".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::AuthError("Bearer token required".to_string()))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            warn!(uri = %parts.uri, "Rejected bearer token");
            e
        })?;

        Ok(Principal::from(claims))
    }
}
