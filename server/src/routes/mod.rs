use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Request};
use axum::routing::{get, post, put, MethodRouter};
use axum::Router;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{
    assignments, auth, counters, displays, health_check, public, services, statistics, tickets,
    users, venues,
};
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Copy)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Registers a collection route with and without the trailing slash.
fn collection(
    router: Router<AppState>,
    path: &str,
    methods: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
}

fn ticket_routes() -> Router<AppState> {
    collection(
        Router::new(),
        "/queue-tickets",
        get(tickets::list_tickets).post(tickets::create_ticket),
    )
    .route(
        "/queue-tickets/:id",
        get(tickets::get_ticket)
            .put(tickets::update_ticket)
            .delete(tickets::delete_ticket),
    )
    .route("/queue-tickets/:id/status", put(tickets::update_ticket_status))
    .route("/waiting-tickets", get(public::waiting_tickets))
    .route("/myticket/:token", get(public::my_ticket))
}

fn display_routes() -> Router<AppState> {
    Router::new()
        .route("/display/create", post(displays::create_display))
        .route("/display/all", get(displays::list_displays))
        .route("/display/next-counter", get(displays::next_counter))
        .route("/display/reset", post(displays::reset_displays))
        .route("/display/analytics", get(displays::display_analytics))
        .route("/display/current-ticket", get(displays::current_ticket))
        .route(
            "/display/:counter_id",
            get(displays::get_display).put(displays::replace_display),
        )
        .route("/display/:counter_id/next", put(displays::assign_next_ticket))
        .route("/display/:counter_id/enqueue", post(displays::enqueue_ticket))
}

fn statistics_routes() -> Router<AppState> {
    Router::new()
        .route("/statistics/active-queues", post(statistics::active_queues))
        .route(
            "/statistics/average-wait-time",
            post(statistics::average_wait_time),
        )
        .route("/statistics/total-served", post(statistics::total_served))
}

fn catalog_routes() -> Router<AppState> {
    let router = collection(
        Router::new(),
        "/venues",
        get(venues::list_venues).post(venues::create_venue),
    )
    .route(
        "/venues/:id",
        get(venues::get_venue)
            .put(venues::update_venue)
            .delete(venues::delete_venue),
    );

    let router = collection(
        router,
        "/services",
        get(services::list_services).post(services::create_service),
    )
    .route(
        "/services/:id",
        get(services::get_service)
            .put(services::update_service)
            .delete(services::delete_service),
    )
    .route(
        "/services/venue/:venue_id",
        get(services::list_services_by_venue),
    );

    collection(
        router,
        "/counters",
        get(counters::list_counters).post(counters::create_counter),
    )
    .route(
        "/counters/:id",
        get(counters::get_counter)
            .put(counters::update_counter)
            .delete(counters::delete_counter),
    )
    .route(
        "/counters/venue/:venue_id",
        get(counters::list_counters_by_venue),
    )
}

fn user_routes() -> Router<AppState> {
    let router = collection(
        Router::new(),
        "/users",
        get(users::list_users).post(users::create_user),
    )
    .route(
        "/users/:id",
        get(users::get_user)
            .put(users::update_user)
            .delete(users::delete_user),
    );

    collection(
        router,
        "/user-counter-map",
        get(assignments::list_mappings).post(assignments::create_mapping),
    )
    .route(
        "/user-counter-map/:id",
        get(assignments::get_mapping)
            .put(assignments::update_mapping)
            .delete(assignments::delete_mapping),
    )
    .route(
        "/user-counter-map/user-by-counter/:counter_id",
        get(assignments::user_by_counter),
    )
    .route(
        "/user-counter-map/counter-by-user/:user_id",
        get(assignments::counter_by_user),
    )
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes())
        .merge(ticket_routes())
        .merge(display_routes())
        .merge(statistics_routes())
        .merge(catalog_routes())
        .merge(user_routes())
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(create_security_headers_layer(config.environment))
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, UuidRequestId))
}
