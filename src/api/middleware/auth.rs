//! JWT authentication middleware.
//!
//! Tenant and admin tokens are signed with different secrets and carry a
//! different `typ`, so neither middleware accepts the other's tokens.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::api::AppState;
use crate::errors::AppError;

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

fn bearer_token(header: &BearerHeader) -> Result<&str, AppError> {
    header
        .as_ref()
        .map(|TypedHeader(Authorization(bearer))| bearer.token())
        .ok_or(AppError::Unauthorized)
}

/// Tenant authentication middleware.
///
/// Verifies the bearer token, re-reads the user and tenant so that a
/// suspension or deactivation applies to tokens already issued, then injects
/// the [`TenantContext`](crate::domain::TenantContext) into the request
/// extensions.
pub async fn tenant_auth_middleware(
    State(state): State<AppState>,
    header: BearerHeader,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&header)?;

    let auth = state.services.auth();
    let claims = auth.verify_token(token)?;
    let ctx = auth.authenticate(&claims).await?;

    tracing::debug!(tenant_id = %ctx.tenant_id, user_id = %ctx.user_id, "Tenant request authenticated");
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

/// Tenant authentication for the plan routes.
///
/// Same as [`tenant_auth_middleware`] except that an expired tenant is let
/// through, so its owner can pick a paid plan.
pub async fn tenant_billing_auth_middleware(
    State(state): State<AppState>,
    header: BearerHeader,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&header)?;

    let auth = state.services.auth();
    let claims = auth.verify_token(token)?;
    let ctx = auth.authenticate_for_billing(&claims).await?;

    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

/// Platform admin authentication middleware.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    header: BearerHeader,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&header)?;

    let admin = state.services.admin();
    let claims = admin.verify_token(token)?;
    let ctx = admin.authenticate(&claims).await?;

    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}
