//! Integration tests for API endpoints.
//!
//! Requests go through the full router (auth, rate limiting, error
//! envelope) backed by the real services over an in-memory database.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bizhub::api::create_router;
use bizhub::errors::{AppError, AppResult};
use bizhub::infra::{Database, RateLimitStore};
use bizhub::AppState;
use common::{TestApp, ADMIN_PASSWORD, OWNER_PASSWORD};

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
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

fn signup(slug: &str) -> Value {
    json!({
        "tenantName": "Acme Supplies",
        "slug": slug,
        "businessType": "inventory",
        "firstName": "Olive",
        "email": format!("owner@{}.test", slug),
        "password": OWNER_PASSWORD,
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let router = create_router(app.state());

    let (status, body) = send(&router, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = TestApp::new().await;
    let router = create_router(app.state());

    let (status, body) = send(&router, Method::GET, "/api/does-not-exist", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "NotFound");
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn test_register_reports_invalid_fields() {
    let app = TestApp::new().await;
    let router = create_router(app.state());

    let mut payload = signup("acme");
    payload["email"] = json!("not-an-email");
    payload["password"] = json!("short");

    let (status, body) = send(&router, Method::POST, "/api/auth/register", None, Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
}

#[tokio::test]
async fn test_register_then_fetch_profile() {
    let app = TestApp::new().await;
    let router = create_router(app.state());

    let (status, body) = send(&router, Method::POST, "/api/auth/register", None, Some(signup("acme"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tenant"]["status"], "trial");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, body) = send(&router, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "owner@acme.test");

    let (status, _) = send(&router, Method::POST, "/api/auth/register", None, Some(signup("acme"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_tenant_routes_require_a_token() {
    let app = TestApp::new().await;
    let router = create_router(app.state());

    let (status, body) = send(&router, Method::GET, "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(&router, Method::GET, "/api/users", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tenant_token_is_not_an_admin_token() {
    let app = TestApp::new().await;
    let router = create_router(app.state());
    let session = app.register("acme").await;

    let (status, _) = send(
        &router,
        Method::GET,
        "/api/admin/tenants",
        Some(&session.token.access_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_suspension_revokes_existing_tokens() {
    let app = TestApp::new().await;
    let router = create_router(app.state());
    let session = app.register("acme").await;
    let owner_token = session.token.access_token.clone();

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/admin/auth/login",
        None,
        Some(json!({ "email": app.config.seed_admin_email, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let admin_token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(&router, Method::GET, "/api/tenant", Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let suspend_uri = format!("/api/admin/tenants/{}/suspend", session.tenant.id);
    let (status, body) = send(
        &router,
        Method::PUT,
        &suspend_uri,
        Some(&admin_token),
        Some(json!({ "reason": "non-payment" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "suspended");

    let (status, body) = send(&router, Method::GET, "/api/tenant", Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/admin/system/logs?targetType=tenant",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["action"], "suspend_tenant");
    assert_eq!(body["data"][0]["details"]["reason"], "non-payment");

    let activate_uri = format!("/api/admin/tenants/{}/activate", session.tenant.id);
    let (status, _) = send(&router, Method::PUT, &activate_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, Method::GET, "/api/tenant", Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_trial_can_still_upgrade() {
    let app = TestApp::new().await;
    let router = create_router(app.state());
    let session = app.register("acme").await;
    app.backdate_trial(session.tenant.id).await;
    let credentials = json!({ "email": "owner@acme.test", "password": OWNER_PASSWORD });

    let (status, body) = send(&router, Method::POST, "/api/auth/login", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Your trial has expired. Please upgrade to continue.");

    let (status, body) = send(&router, Method::POST, "/api/auth/billing/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(&router, Method::GET, "/api/tenant", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&router, Method::GET, "/api/tenant/plans", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let basic = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "basic")
        .unwrap()["id"]
        .clone();

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/tenant/upgrade",
        Some(&token),
        Some(json!({ "planId": basic })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");

    let (status, _) = send(&router, Method::GET, "/api/tenant", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

/// Counter store that has already used up every window
struct Exhausted;

#[async_trait]
impl RateLimitStore for Exhausted {
    async fn check_rate_limit(&self, _: &str, max_requests: u64, _: u64) -> AppResult<(u64, bool)> {
        Ok((max_requests + 1, false))
    }

    async fn ping(&self) -> AppResult<()> {
        Err(AppError::internal("counter store offline"))
    }
}

#[tokio::test]
async fn test_exhausted_quota_returns_too_many_requests() {
    let app = TestApp::new().await;
    let state = AppState::new(
        Arc::new(app.services.clone()),
        Arc::new(Exhausted),
        Arc::new(Database::from_connection(app.db.clone())),
    );
    let router = create_router(state);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "owner@acme.test", "password": OWNER_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "TooManyRequests");

    // Health reports the unreachable counter store
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["services"]["cache"]["status"], "unhealthy");
}
