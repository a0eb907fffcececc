//! Tenant signup, login and session handlers.

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::tenant_auth_middleware;
use crate::api::AppState;
use crate::domain::{Profile, RegisterTenant, TenantContext};
use crate::errors::AppResult;
use crate::services::AuthSession;
use crate::types::{ApiResponse, Created};

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "owner@acme.test")]
    pub email: String,
    /// User password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Create authentication routes. `/me` requires a tenant token.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/billing/login", post(billing_login))
        .merge(
            Router::new()
                .route("/me", get(me))
                .route_layer(middleware::from_fn_with_state(state, tenant_auth_middleware)),
        )
}

/// Register a new business and its owner account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterTenant,
    responses(
        (status = 201, description = "Tenant created on the trial plan", body = AuthSession),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Slug or email already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterTenant>,
) -> AppResult<Created<AuthSession>> {
    let session = state.services.auth().register(payload).await?;
    Ok(Created(session))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthSession),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated, tenant suspended or trial expired")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state
        .services
        .auth()
        .login(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::success(session))
}

/// Login for choosing a plan. Also succeeds for an expired trial; the token
/// then only opens the plan routes until the tenant upgrades.
#[utoipa::path(
    post,
    path = "/api/auth/billing/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthSession),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated or tenant suspended")
    )
)]
pub async fn billing_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state
        .services
        .auth()
        .billing_login(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::success(session))
}

/// Current user with tenant summary and enabled modules
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed-in user", body = Profile),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state.services.auth().profile(&ctx).await?;
    Ok(ApiResponse::success(profile))
}
