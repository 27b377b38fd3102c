//! End-to-end scenarios against the full router with an in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use userhub_rs::AppState;
use userhub_rs::api::routes::create_router;
use userhub_rs::repositories::Repositories;

const SECRET: &str = "integration_test_secret_0123456789abcdef";

fn app() -> Router {
    create_router(AppState::new(Repositories::in_memory(), SECRET))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/login",
        None,
        Some(json!({ "email": email, "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_and_list() {
    let app = app();

    let ann = register(&app, "Ann", "ann@x.com").await;
    assert_eq!(ann["name"], "Ann");
    assert_eq!(ann["email"], "ann@x.com");
    assert!(ann.get("password").is_none());
    assert!(!ann["id"].as_str().unwrap().is_empty());

    let token = login(&app, "ann@x.com").await;
    assert!(!token.is_empty());

    let (status, _) = send(&app, "GET", "/api/v1/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, users) = send(&app, "GET", "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "ann@x.com");
    assert!(users[0].get("password").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app();
    register(&app, "Ann", "ann@x.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/register",
        None,
        Some(json!({ "name": "Other", "email": "ann@x.com", "password": "another-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn registration_validation_errors() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/register",
        None,
        Some(json!({ "name": "", "email": "ann@x", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["details"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["email", "name", "password"]);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/register",
        None,
        Some(json!({ "name": "Ann" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app();
    register(&app, "Ann", "ann@x.com").await;

    let (wrong_status, wrong_body) = send(
        &app,
        "POST",
        "/api/v1/login",
        None,
        Some(json!({ "email": "ann@x.com", "password": "wrong-password" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/api/v1/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "longpass1" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["code"], unknown_body["code"]);
    assert_eq!(wrong_body["message"], unknown_body["message"]);
}

#[tokio::test]
async fn login_with_missing_credential_is_unauthorized() {
    let app = app();
    register(&app, "Ann", "ann@x.com").await;

    for body in [json!({ "email": "ann@x.com" }), json!({ "password": "longpass1" }), json!({})] {
        let (status, response) = send(&app, "POST", "/api/v1/login", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", body);
        assert_eq!(response["code"], "INVALID_CREDENTIALS");
    }
}

#[tokio::test]
async fn get_update_and_delete_user() {
    let app = app();
    let ann = register(&app, "Ann", "ann@x.com").await;
    let id = ann["id"].as_str().unwrap();
    let token = login(&app, "ann@x.com").await;
    let path = format!("/api/v1/users/{}", id);

    let (status, body) = send(&app, "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (status, body) = send(
        &app,
        "PUT",
        &path,
        Some(&token),
        Some(json!({ "name": "Ann", "email": "bad-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        "PUT",
        &path,
        Some(&token),
        Some(json!({ "name": "Annie", "email": "annie@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", &path, Some(&token), None).await;
    assert_eq!(body["name"], "Annie");
    assert_eq!(body["email"], "annie@x.com");

    let (status, _) = send(&app, "DELETE", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn unknown_ids_are_accepted_for_update_and_delete() {
    let app = app();
    register(&app, "Ann", "ann@x.com").await;
    let token = login(&app, "ann@x.com").await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/users/does-not-exist",
        Some(&token),
        Some(json!({ "name": "Ghost", "email": "ghost@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", "/api/v1/users/does-not-exist", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, users) = send(&app, "GET", "/api/v1/users", Some(&token), None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn protected_routes_reject_foreign_tokens() {
    let app = app();
    let foreign = AppState::new(
        Repositories::in_memory(),
        "some_other_secret_0123456789abcdefghij",
    )
    .tokens
    .generate_token("intruder")
    .unwrap();

    let (status, body) = send(&app, "GET", "/api/v1/users", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app();
    let request = Request::builder()
        .uri("/api/v1/users")
        .header("x-request-id", "trace-me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], "trace-me");
}

#[tokio::test]
async fn health_endpoints() {
    let app = app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (status, body) = send(&app(), "GET", "/api/v2/nothing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
