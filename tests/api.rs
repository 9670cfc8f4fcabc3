//! End-to-end tests of the HTTP surface against in-memory stores.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use seat_reservation::config::{
    AdminConfig, AppConfig, Config, DatabaseConfig, JwtConfig, ReservationConfig,
};
use seat_reservation::engine::{NoFailure, ReservationEngine};
use seat_reservation::store::{MemorySeatStore, MemoryUserStore, UserStore};
use seat_reservation::AppState;

const SEAT_COUNT: i64 = 20;
const PASSWORD: &str = "password123";

fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "warn".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            pool_size: 1,
        },
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_ttl_minutes: 60,
            refresh_ttl_days: 7,
        },
        reservation: ReservationConfig { failure_rate: 0.0 },
        admin: AdminConfig {
            username: None,
            password: None,
        },
    }
}

/// App over in-memory stores, seeded with alice, bob and an admin.
async fn test_app() -> Router {
    let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    // Low bcrypt cost keeps the seeded fixtures fast.
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    users.create("alice", &hash, false).await.unwrap();
    users.create("bob", &hash, false).await.unwrap();
    users.create("admin", &hash, true).await.unwrap();

    let engine = ReservationEngine::new(
        Arc::new(MemorySeatStore::new(SEAT_COUNT)),
        Arc::new(NoFailure),
    );

    seat_reservation::app(Arc::new(AppState {
        engine,
        users,
        config: test_config(),
    }))
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
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/users/login/",
        None,
        Some(json!({ "username": username, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access"].as_str().unwrap().to_string()
}

async fn list_seats(app: &Router) -> Vec<Value> {
    let (status, body) = send(app, Method::GET, "/api/seats/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn health_endpoint_answers() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn seat_list_is_public_and_ordered() {
    let app = test_app().await;
    let seats = list_seats(&app).await;
    assert_eq!(seats.len(), SEAT_COUNT as usize);
    assert_eq!(seats[0], json!({ "seatNumber": 1, "isReserved": false }));
    let numbers: Vec<i64> = seats.iter().map(|s| s["seatNumber"].as_i64().unwrap()).collect();
    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn signup_validates_and_creates_users() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/signup/",
        None,
        Some(json!({ "username": "carol", "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "username": "carol" }));

    // Duplicate username
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/signup/",
        None,
        Some(json!({ "username": "carol", "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Short password
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/signup/",
        None,
        Some(json!({ "username": "dave", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty username
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/signup/",
        None,
        Some(json!({ "username": "", "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The new account can log in.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/login/",
        None,
        Some(json!({ "username": "carol", "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
}

#[tokio::test]
async fn login_rejects_bad_input() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/login/",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/login/",
        None,
        Some(json!({ "username": "alice", "password": "wrongpassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn reservation_flow_matches_the_contract() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    // Alice reserves seat 10.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/seats/reserve/",
        Some(&alice),
        Some(json!({ "seatNumber": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let seats = list_seats(&app).await;
    assert_eq!(seats[9], json!({ "seatNumber": 10, "isReserved": true }));

    // Reserving it again conflicts, for Alice and for Bob alike.
    for token in [&alice, &bob] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/seats/reserve/",
            Some(token),
            Some(json!({ "seatNumber": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
    }

    // Only Alice's reservations show up under her account.
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/users/me/reservations/",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "seatNumber": 10, "isReserved": true }]));

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/users/me/reservations/",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body, json!([]));

    // Bob cannot cancel Alice's reservation.
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/seats/10/cancel/",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice can.
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/seats/10/cancel/",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let seats = list_seats(&app).await;
    assert_eq!(seats[9], json!({ "seatNumber": 10, "isReserved": false }));

    // A second cancel finds the seat already free.
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/seats/10/cancel/",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_cancel_any_reservation() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;
    let admin = login(&app, "admin").await;

    send(
        &app,
        Method::POST,
        "/api/seats/reserve/",
        Some(&alice),
        Some(json!({ "seatNumber": 3 })),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/seats/3/cancel/",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Cancelling a free seat as admin reports the state error.
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/seats/3/cancel/",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reserve_error_paths() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;

    // Unknown seat
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/seats/reserve/",
        Some(&alice),
        Some(json!({ "seatNumber": 99999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Malformed body
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/seats/reserve/",
        Some(&alice),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // No token
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/seats/reserve/",
        None,
        Some(json!({ "seatNumber": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Garbage token
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/seats/reserve/",
        Some("not-a-token"),
        Some(json!({ "seatNumber": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let app = test_app().await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/users/login/",
        None,
        Some(json!({ "username": "alice", "password": PASSWORD })),
    )
    .await;
    let refresh = body["refresh"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users/me/reservations/",
        Some(refresh),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reset_is_admin_only_and_frees_everything() {
    let app = test_app().await;
    let alice = login(&app, "alice").await;
    let admin = login(&app, "admin").await;

    for seat in [1, 2, 3] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/seats/reserve/",
            Some(&alice),
            Some(json!({ "seatNumber": seat })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(&app, Method::POST, "/api/seats/reset/", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    // A forbidden reset changed nothing.
    let reserved = list_seats(&app)
        .await
        .iter()
        .filter(|s| s["isReserved"] == json!(true))
        .count();
    assert_eq!(reserved, 3);

    let (status, body) = send(&app, Method::POST, "/api/seats/reset/", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(SEAT_COUNT));
    assert!(list_seats(&app)
        .await
        .iter()
        .all(|s| s["isReserved"] == json!(false)));

    // Idempotent: the second reset succeeds as well.
    let (status, body) = send(&app, Method::POST, "/api/seats/reset/", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(SEAT_COUNT));
}
