use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use queue_server::auth::TokenService;
use queue_server::config::Config;
use queue_server::routes::create_routes;
use queue_server::state::AppState;
use queue_server::store::{MemoryStore, Store};

fn app() -> Router {
    let config = Config::for_tests();
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiry_hours);
    create_routes(AppState::new(store, tokens), &config)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "company_name": format!("{username} corp"),
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    login(app, username).await
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

struct Setup {
    venue_id: i64,
    service_id: i64,
    counter_id: i64,
}

async fn setup_catalog(app: &Router, token: &str) -> Setup {
    let (status, venue) = send(
        app,
        Method::POST,
        "/venues",
        Some(token),
        Some(json!({ "venue_name": "Main Branch", "city": "Bandung" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let venue_id = venue["data"]["venue_id"].as_i64().unwrap();

    let (status, service) = send(
        app,
        Method::POST,
        "/services",
        Some(token),
        Some(json!({ "venue_id": venue_id, "service_name": "Teller" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let service_id = service["data"]["service_id"].as_i64().unwrap();

    let (status, counter) = send(
        app,
        Method::POST,
        "/counters",
        Some(token),
        Some(json!({
            "venue_id": venue_id,
            "service_id": service_id,
            "counter_name": "Counter 1",
            "operator_name": "Dewi",
            "operator_nik": "3201",
            "open_time": "08:00:00",
            "close_time": "17:00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let counter_id = counter["data"]["counter_id"].as_i64().unwrap();

    Setup {
        venue_id,
        service_id,
        counter_id,
    }
}

async fn issue(app: &Router, token: &str, setup: &Setup, name: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/queue-tickets",
        Some(token),
        Some(json!({
            "venue_id": setup.venue_id,
            "service_id": setup.service_id,
            "customer_name": name,
            "customer_email": format!("{}@mail.test", name.to_lowercase()),
            "customer_phone": "0812",
        })),
    )
    .await
}

async fn create_display(app: &Router, token: &str, setup: &Setup) {
    let (status, _) = send(
        app,
        Method::POST,
        "/display/create",
        Some(token),
        Some(json!({
            "venue_id": setup.venue_id,
            "service_id": setup.service_id,
            "counter_id": setup.counter_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn create_operator(app: &Router, admin: &str, username: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/users",
        Some(admin),
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret123",
            "role_id": 2,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, username).await
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_missing_bearer_is_rejected() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/queue-tickets", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_bad_credentials_are_rejected() {
    let app = app();
    register_and_login(&app, "alice").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "not-it" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tickets_are_numbered_per_service() {
    let app = app();
    let token = register_and_login(&app, "alice").await;
    let setup = setup_catalog(&app, &token).await;

    for expected in ["1", "2", "3"] {
        let (status, body) = issue(&app, &token, &setup, "Budi").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["queue_number"], expected);
        assert_eq!(body["data"]["status"], "waiting");
        assert_eq!(body["data"]["token"].as_str().unwrap().len(), 8);
    }

    let (status, body) = send(&app, Method::GET, "/queue-tickets/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_foreign_tenant_is_forbidden() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;
    let setup = setup_catalog(&app, &alice).await;

    let (status, _) = issue(&app, &bob, &setup, "Mallory").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, ticket) = issue(&app, &alice, &setup, "Budi").await;
    assert_eq!(status, StatusCode::CREATED);
    let ticket_id = ticket["data"]["ticket_id"].as_i64().unwrap();

    let uri = format!("/queue-tickets/{ticket_id}");
    let (status, _) = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/queue-tickets/9999", Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_transitions() {
    let app = app();
    let token = register_and_login(&app, "alice").await;
    let setup = setup_catalog(&app, &token).await;
    let (_, ticket) = issue(&app, &token, &setup, "Budi").await;
    let uri = format!(
        "/queue-tickets/{}/status",
        ticket["data"]["ticket_id"].as_i64().unwrap()
    );

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "status": "called", "counter_id": setup.counter_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "called");
    assert!(body["data"]["called_at"].is_string());
    assert_eq!(body["data"]["counter_id"], setup.counter_id);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["completed_at"].is_string());

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "status": "waiting" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_display_pops_in_order() {
    let app = app();
    let token = register_and_login(&app, "alice").await;
    let setup = setup_catalog(&app, &token).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/display/create",
        Some(&token),
        Some(json!({
            "venue_id": setup.venue_id,
            "service_id": setup.service_id,
            "counter_id": setup.counter_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let enqueue = format!("/display/{}/enqueue", setup.counter_id);
    for label in ["A1", "A2"] {
        let (status, _) = send(
            &app,
            Method::POST,
            &enqueue,
            Some(&token),
            Some(json!({ "ticket": label })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let next = format!("/display/{}/next", setup.counter_id);
    let (_, body) = send(&app, Method::PUT, &next, Some(&token), None).await;
    assert_eq!(body["data"]["current_ticket"], "A1");
    assert_eq!(body["data"]["next_tickets"], json!(["A2"]));

    let (_, body) = send(&app, Method::PUT, &next, Some(&token), None).await;
    assert_eq!(body["data"]["current_ticket"], "A2");

    let (status, body) = send(&app, Method::PUT, &next, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NO_TICKETS_AVAILABLE");

    let uri = format!("/display/current-ticket?counter_id={}", setup.counter_id);
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_ticket"], "A2");
}

#[tokio::test]
async fn test_public_lookup_and_statistics() {
    let app = app();
    let token = register_and_login(&app, "alice").await;
    let setup = setup_catalog(&app, &token).await;
    let (_, ticket) = issue(&app, &token, &setup, "Budi").await;
    let ticket_token = ticket["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/myticket/{ticket_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service_name"], "Teller");
    assert_eq!(body["data"]["venue_name"], "Main Branch");
    assert!(body["data"]["average_queue_time_minutes"].is_null());

    let (status, _) = send(&app, Method::GET, "/myticket/unknown1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/statistics/active-queues",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["active_queues"], 1);

    let uri = format!(
        "/waiting-tickets?venue_id={}&service_id={}",
        setup.venue_id, setup.service_id
    );
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tickets"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/waiting-tickets", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_operator_cannot_reset_displays() {
    let app = app();
    let admin = register_and_login(&app, "alice").await;

    let operator = create_operator(&app, &admin, "operator1").await;

    let (status, _) = send(&app, Method::POST, "/display/reset", Some(&operator), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::POST, "/display/reset", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cleared"], 0);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn test_blank_and_zero_display_filters_are_unfiltered() {
    let app = app();
    let token = register_and_login(&app, "alice").await;
    let setup = setup_catalog(&app, &token).await;
    create_display(&app, &token, &setup).await;

    for query in ["venue_id=&service_id=", "venue_id=0&service_id=0", ""] {
        let uri = format!("/display/next-counter?{query}");
        let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["data"].as_array().unwrap().len(), 1, "{uri}");
    }

    let uri = format!(
        "/display/current-ticket?venue_id=0&service_id=0&counter_id={}",
        setup.counter_id
    );
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["counter_id"], setup.counter_id);

    let (status, _) = send(
        &app,
        Method::GET,
        "/display/analytics?venue_id=&service_id=&date=",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::GET,
        "/waiting-tickets?venue_id=&service_id=",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_registered_tenant_resets_only_its_own_displays() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;
    let setup = setup_catalog(&app, &alice).await;
    create_display(&app, &alice, &setup).await;
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/display/{}/enqueue", setup.counter_id),
        Some(&alice),
        Some(json!({ "ticket": "A1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mallory = register_and_login(&app, "mallory").await;
    let (_, me) = send(&app, Method::GET, "/auth/me", Some(&mallory), None).await;
    assert_eq!(me["data"]["role"], "admin");

    let (status, body) = send(&app, Method::POST, "/display/reset", Some(&mallory), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cleared"], 0);

    let uri = format!("/display/{}", setup.counter_id);
    let (_, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(body["data"]["next_tickets"], json!(["A1"]));

    let (_, body) = send(&app, Method::POST, "/display/reset", Some(&alice), None).await;
    assert_eq!(body["data"]["cleared"], 1);
    let (_, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(body["data"]["next_tickets"], json!([]));
}

#[tokio::test]
async fn test_full_update_cannot_prestamp_a_waiting_ticket() {
    let app = app();
    let token = register_and_login(&app, "alice").await;
    let setup = setup_catalog(&app, &token).await;
    let (_, ticket) = issue(&app, &token, &setup, "Budi").await;
    let ticket_id = ticket["data"]["ticket_id"].as_i64().unwrap();
    let uri = format!("/queue-tickets/{ticket_id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({
            "status": "waiting",
            "called_at": "2099-01-01T00:00:00Z",
            "completed_at": "2099-01-01T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let status_uri = format!("{uri}/status");
    for next in ["called", "completed"] {
        let (status, _) = send(
            &app,
            Method::PUT,
            &status_uri,
            Some(&token),
            Some(json!({ "status": next })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(body["data"]["status"], "completed");
    assert!(!body["data"]["called_at"].as_str().unwrap().starts_with("2099"));
    assert!(!body["data"]["completed_at"].as_str().unwrap().starts_with("2099"));
}

#[tokio::test]
async fn test_operator_acts_inside_its_admin_scope() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;
    let alice_setup = setup_catalog(&app, &alice).await;
    let bob_setup = setup_catalog(&app, &bob).await;
    let operator = create_operator(&app, &alice, "operator1").await;

    for collection in ["/venues", "/services", "/counters"] {
        let (status, body) = send(&app, Method::GET, collection, Some(&operator), None).await;
        assert_eq!(status, StatusCode::OK, "{collection}");
        assert_eq!(body["data"].as_array().unwrap().len(), 1, "{collection}");
    }

    let own = format!("/venues/{}", alice_setup.venue_id);
    let (status, _) = send(&app, Method::GET, &own, Some(&operator), None).await;
    assert_eq!(status, StatusCode::OK);

    let foreign = format!("/venues/{}", bob_setup.venue_id);
    let (status, _) = send(&app, Method::GET, &foreign, Some(&operator), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        Method::PUT,
        &foreign,
        Some(&operator),
        Some(json!({ "venue_name": "Taken Over" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = issue(&app, &operator, &alice_setup, "Budi").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["queue_number"], "1");

    let (status, _) = issue(&app, &operator, &bob_setup, "Budi").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
