//! Tenant self-service handlers.

use axum::{
    extract::State,
    routing::{get, put},
    Extension, Json, Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{EnabledModule, Plan, Tenant, TenantContext, TenantOverview, UpdateTenant, UpgradePlan};
use crate::errors::AppResult;
use crate::types::ApiResponse;

pub fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(current_tenant).put(rename_tenant))
        .route("/modules", get(enabled_modules))
}

/// Plan selection. Mounted behind the billing session check so an expired
/// tenant can still upgrade.
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/upgrade", put(upgrade_plan))
        .route("/plans", get(available_plans))
}

/// Current tenant with plan, limits, usage and trial countdown
pub async fn current_tenant(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<TenantOverview>> {
    let overview = state.services.tenants().overview(&ctx).await?;
    Ok(ApiResponse::success(overview))
}

pub async fn rename_tenant(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<UpdateTenant>,
) -> AppResult<ApiResponse<Tenant>> {
    let tenant = state.services.tenants().rename(&ctx, payload).await?;
    Ok(ApiResponse::with_message(tenant, "Tenant updated"))
}

/// Move to a paid plan (owner only)
pub async fn upgrade_plan(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<UpgradePlan>,
) -> AppResult<ApiResponse<TenantOverview>> {
    let overview = state.services.tenants().upgrade(&ctx, payload.plan_id).await?;
    Ok(ApiResponse::with_message(overview, "Plan upgraded"))
}

pub async fn enabled_modules(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<Vec<EnabledModule>>> {
    let modules = state.services.tenants().modules(&ctx).await?;
    Ok(ApiResponse::success(modules))
}

pub async fn available_plans(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Plan>>> {
    let plans = state.services.tenants().available_plans().await?;
    Ok(ApiResponse::success(plans))
}
