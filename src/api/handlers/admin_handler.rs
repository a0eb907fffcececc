//! Platform admin handlers.
//!
//! Everything except `/auth/login` sits behind the admin token middleware and
//! receives an [`AdminContext`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::health_handler::{check_services, HealthResponse};
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::admin_auth_middleware;
use crate::api::AppState;
use crate::domain::{
    AdminContext, AdminLogin, AuditEntry, AuditFilter, CreatePlan, GrowthPoint, Plan, PlanShare,
    PlanSummary, PlatformAdmin, PlatformOverview, SuspendTenant, Tenant, TenantDetail,
    TenantFilter, TenantListItem, UpdatePlan,
};
use crate::errors::AppResult;
use crate::services::AdminSession;
use crate::types::{ApiResponse, Created, PaginationParams};
use policy::LimitSet;

/// Replacement tenant limit overrides. An empty object clears them.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetTenantLimits {
    #[schema(value_type = Object)]
    pub custom_limits: LimitSet,
}

/// Create admin routes. `/auth/login` is public.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(me))
        .route("/tenants", get(list_tenants))
        .route("/tenants/:id", get(tenant_detail))
        .route("/tenants/:id/suspend", put(suspend_tenant))
        .route("/tenants/:id/activate", put(activate_tenant))
        .route("/tenants/:id/limits", put(set_tenant_limits))
        .route("/plans", get(list_plans).post(create_plan))
        .route(
            "/plans/:id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/system/health", get(system_health))
        .route("/system/logs", get(audit_logs))
        .route("/analytics/overview", get(overview))
        .route("/analytics/growth", get(tenant_growth))
        .route("/analytics/plans", get(plan_distribution))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware));

    Router::new()
        .route("/auth/login", post(login))
        .merge(protected)
}

// =============================================================================
// Session
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    tag = "Admin",
    request_body = AdminLogin,
    responses(
        (status = 200, description = "Login successful", body = AdminSession),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Admin account disabled")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AdminLogin>,
) -> AppResult<ApiResponse<AdminSession>> {
    let session = state
        .services
        .admin()
        .login(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::success(session))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
) -> AppResult<ApiResponse<PlatformAdmin>> {
    let admin = state.services.admin().me(&ctx).await?;
    Ok(ApiResponse::success(admin))
}

// =============================================================================
// Tenants
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/tenants",
    tag = "Admin",
    security(("admin_auth" = [])),
    params(PaginationParams, TenantFilter),
    responses(
        (status = 200, description = "One page of tenants with user counts", body = Vec<TenantListItem>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<TenantFilter>,
) -> AppResult<ApiResponse<Vec<TenantListItem>>> {
    let tenants = state
        .services
        .admin()
        .list_tenants(filter, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(tenants))
}

#[utoipa::path(
    get,
    path = "/api/admin/tenants/{id}",
    tag = "Admin",
    security(("admin_auth" = [])),
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Tenant with plan, limits, usage and users", body = TenantDetail),
        (status = 404, description = "Tenant not found")
    )
)]
pub async fn tenant_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<TenantDetail>> {
    let detail = state.services.admin().tenant_detail(id).await?;
    Ok(ApiResponse::success(detail))
}

#[utoipa::path(
    put,
    path = "/api/admin/tenants/{id}/suspend",
    tag = "Admin",
    security(("admin_auth" = [])),
    params(("id" = Uuid, Path, description = "Tenant ID")),
    request_body = SuspendTenant,
    responses(
        (status = 200, description = "Tenant suspended", body = Tenant),
        (status = 404, description = "Tenant not found"),
        (status = 409, description = "Tenant cannot be suspended from its current status")
    )
)]
pub async fn suspend_tenant(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SuspendTenant>,
) -> AppResult<ApiResponse<Tenant>> {
    let tenant = state
        .services
        .admin()
        .suspend_tenant(&ctx, id, payload.reason)
        .await?;

    Ok(ApiResponse::with_message(tenant, "Tenant suspended"))
}

#[utoipa::path(
    put,
    path = "/api/admin/tenants/{id}/activate",
    tag = "Admin",
    security(("admin_auth" = [])),
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Tenant reactivated", body = Tenant),
        (status = 404, description = "Tenant not found"),
        (status = 409, description = "Only suspended tenants can be activated")
    )
)]
pub async fn activate_tenant(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Tenant>> {
    let tenant = state.services.admin().activate_tenant(&ctx, id).await?;
    Ok(ApiResponse::with_message(tenant, "Tenant activated"))
}

#[utoipa::path(
    put,
    path = "/api/admin/tenants/{id}/limits",
    tag = "Admin",
    security(("admin_auth" = [])),
    params(("id" = Uuid, Path, description = "Tenant ID")),
    request_body = SetTenantLimits,
    responses(
        (status = 200, description = "Overrides replaced", body = Tenant),
        (status = 404, description = "Tenant not found")
    )
)]
pub async fn set_tenant_limits(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetTenantLimits>,
) -> AppResult<ApiResponse<Tenant>> {
    let tenant = state
        .services
        .admin()
        .set_tenant_limits(&ctx, id, payload.custom_limits)
        .await?;

    Ok(ApiResponse::with_message(tenant, "Tenant limits updated"))
}

// =============================================================================
// Plans
// =============================================================================

pub async fn create_plan(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    ValidatedJson(payload): ValidatedJson<CreatePlan>,
) -> AppResult<Created<Plan>> {
    let plan = state.services.admin().create_plan(&ctx, payload).await?;
    Ok(Created(plan))
}

pub async fn list_plans(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<PlanSummary>>> {
    let plans = state.services.admin().list_plans().await?;
    Ok(ApiResponse::success(plans))
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<PlanSummary>> {
    let plan = state.services.admin().get_plan(id).await?;
    Ok(ApiResponse::success(plan))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePlan>,
) -> AppResult<ApiResponse<Plan>> {
    let plan = state.services.admin().update_plan(&ctx, id, payload).await?;
    Ok(ApiResponse::with_message(plan, "Plan updated"))
}

/// Blocked while any tenant is on the plan
pub async fn delete_plan(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.admin().delete_plan(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// System and analytics
// =============================================================================

/// Database and cache round-trip times
pub async fn system_health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    ApiResponse::success(check_services(&state).await)
}

pub async fn audit_logs(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<AuditFilter>,
) -> AppResult<ApiResponse<Vec<AuditEntry>>> {
    let entries = state
        .services
        .admin()
        .audit_logs(filter, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(entries))
}

pub async fn overview(State(state): State<AppState>) -> AppResult<ApiResponse<PlatformOverview>> {
    let overview = state.services.admin().overview().await?;
    Ok(ApiResponse::success(overview))
}

pub async fn tenant_growth(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<GrowthPoint>>> {
    let growth = state.services.admin().tenant_growth().await?;
    Ok(ApiResponse::success(growth))
}

pub async fn plan_distribution(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<PlanShare>>> {
    let shares = state.services.admin().plan_distribution().await?;
    Ok(ApiResponse::success(shares))
}
