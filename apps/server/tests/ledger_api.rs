use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use jsonwebtoken::{encode, EncodingKey, Header};
use networth_server::{
    api::app_router,
    build_state,
    config::{Config, StoreKind},
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const SECRET: [u8; 32] = [42u8; 32];

fn test_config(tmp: &TempDir, store: StoreKind, jwt_secret: Option<String>) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        store,
        local_cache_dir: tmp.path().join("local").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        jwt_secret,
    }
}

async fn build_test_router(tmp: &TempDir, store: StoreKind) -> Router {
    let config = test_config(tmp, store, None);
    let state = build_state(&config).await.unwrap();
    app_router(state, &config)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).to_string())
        })
    };
    (status, body)
}

fn get(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", user)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: Method, uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn healthz_works_without_identity() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, StoreKind::Memory).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn ledger_routes_require_a_user() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, StoreKind::Memory).await;

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/v1/ledger")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn new_user_lands_on_an_empty_ledger() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, StoreKind::Sqlite).await;

    let (status, summary) = send(&app, get("/api/v1/ledger", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["state"], "empty");
    assert_eq!(summary["latest"], Value::Null);
    assert_eq!(summary["breakdown"], json!([]));
    assert_eq!(summary["series"], json!([]));

    let (_, latest) = send(&app, get("/api/v1/ledger/latest", "alice")).await;
    assert_eq!(latest, Value::Null);
}

#[tokio::test]
async fn commit_flow_updates_every_view() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, StoreKind::Sqlite).await;

    let (status, first) = send(
        &app,
        with_json(
            Method::POST,
            "/api/v1/ledger/snapshots",
            "alice",
            json!({ "values": { "stocks": "1000", "savings": "500" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["networth"], json!(1500.0));

    let (status, second) = send(
        &app,
        with_json(
            Method::POST,
            "/api/v1/ledger/snapshots",
            "alice",
            json!({ "values": { "stocks": "200" }, "mode": "incremental" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["networth"], json!(1700.0));
    assert_eq!(second["stocks"], json!(1200.0));

    let (_, snapshots) = send(&app, get("/api/v1/ledger/snapshots", "alice")).await;
    assert_eq!(snapshots.as_array().unwrap().len(), 2);

    let (_, series) = send(&app, get("/api/v1/ledger/series", "alice")).await;
    let series = series.as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["netWorth"], json!(1500.0));
    assert_eq!(series[1]["netWorth"], json!(1700.0));

    let (_, breakdown) = send(&app, get("/api/v1/ledger/breakdown", "alice")).await;
    let breakdown = breakdown.as_array().unwrap();
    assert_eq!(breakdown.len(), 7);
    assert_eq!(breakdown[0]["label"], "Stocks");
    assert_eq!(breakdown[0]["value"], json!(1200.0));

    let (_, change) = send(&app, get("/api/v1/ledger/change", "alice")).await;
    let change = change["changePercent"].as_f64().unwrap();
    assert!((change - 13.333333).abs() < 1e-9);
}

#[tokio::test]
async fn invalid_fields_come_back_per_field() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, StoreKind::Memory).await;

    let (status, body) = send(
        &app,
        with_json(
            Method::POST,
            "/api/v1/ledger/snapshots",
            "alice",
            json!({ "values": { "stocks": "-50", "crypto": "1.2.3", "savings": "10" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = body["fieldErrors"].as_object().unwrap();
    assert_eq!(fields.len(), 2);
    assert!(fields.contains_key("stocks"));
    assert!(fields.contains_key("crypto"));

    let (_, summary) = send(&app, get("/api/v1/ledger", "alice")).await;
    assert_eq!(summary["state"], "empty");
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, StoreKind::Memory).await;

    let (status, _) = send(
        &app,
        with_json(
            Method::POST,
            "/api/v1/ledger/snapshots",
            "alice",
            json!({ "values": { "gold": "10" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn goal_is_validated_and_tracked() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, StoreKind::Local).await;

    send(
        &app,
        with_json(
            Method::POST,
            "/api/v1/ledger/snapshots",
            "alice",
            json!({ "values": { "savings": "1200" } }),
        ),
    )
    .await;

    let (status, _) = send(
        &app,
        with_json(Method::PUT, "/api/v1/ledger/goal", "alice", json!({ "goal": "0" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, goal) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/ledger/goal",
            "alice",
            json!({ "goal": "2000" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["goal"], json!(2000.0));

    let (_, progress) = send(&app, get("/api/v1/ledger/goal/progress", "alice")).await;
    assert_eq!(progress["percent"], json!(60.0));
    assert_eq!(progress["remaining"], json!(800.0));

    let (_, goal) = send(&app, get("/api/v1/ledger/goal", "bob")).await;
    assert_eq!(goal["goal"], Value::Null);
}

#[tokio::test]
async fn users_never_see_each_others_data() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, StoreKind::Sqlite).await;

    send(
        &app,
        with_json(
            Method::POST,
            "/api/v1/ledger/snapshots",
            "alice",
            json!({ "values": { "crypto": "99" } }),
        ),
    )
    .await;

    let (_, summary) = send(&app, get("/api/v1/ledger", "bob")).await;
    assert_eq!(summary["state"], "empty");
    let (_, summary) = send(&app, get("/api/v1/ledger", "alice")).await;
    assert_eq!(summary["state"], "populated");
}

#[derive(serde::Serialize)]
struct TestClaims {
    sub: String,
    exp: usize,
}

fn token_for(sub: &str) -> String {
    let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
    encode(
        &Header::default(),
        &TestClaims {
            sub: sub.to_string(),
            exp,
        },
        &EncodingKey::from_secret(&SECRET),
    )
    .unwrap()
}

#[tokio::test]
async fn bearer_tokens_scope_requests_to_their_subject() {
    let tmp = tempdir().unwrap();
    let config = test_config(&tmp, StoreKind::Memory, Some(BASE64.encode(SECRET)));
    let state = build_state(&config).await.unwrap();
    let app = app_router(state, &config);

    // The development header is ignored once tokens are configured.
    let (status, _) = send(&app, get("/api/v1/ledger", "alice")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, snapshot) = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/ledger/snapshots")
            .header(header::AUTHORIZATION, format!("Bearer {}", token_for("alice")))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "values": { "stocks": "10" } }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["networth"], json!(10.0));

    let (status, latest) = send(
        &app,
        Request::builder()
            .uri("/api/v1/ledger/latest")
            .header(header::AUTHORIZATION, format!("Bearer {}", token_for("alice")))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["stocks"], json!(10.0));

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/v1/ledger")
            .header(header::AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please sign in to continue");
}
