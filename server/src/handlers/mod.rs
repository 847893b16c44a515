use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod assignments;
pub mod auth;
pub mod counters;
pub mod displays;
pub mod public;
pub mod services;
pub mod statistics;
pub mod tickets;
pub mod users;
pub mod venues;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "queue-server",
    };

    success(payload, "Health check successful")
}
