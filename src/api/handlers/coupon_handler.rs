//! Coupon handlers.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Coupon, CouponValidation, CreateCoupon, TenantContext, UpdateCoupon, ValidateCoupon};
use crate::errors::AppResult;
use crate::services::CouponRemoval;
use crate::types::{ApiResponse, Created, PaginationParams};

pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route("/validate", post(validate_coupon))
        .route(
            "/:id",
            get(get_coupon).put(update_coupon).delete(delete_coupon),
        )
}

/// Check a code against an order total without redeeming it
#[utoipa::path(
    post,
    path = "/api/shop/coupons/validate",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    request_body = ValidateCoupon,
    responses(
        (status = 200, description = "Verdict. A rejected code still answers 200 with `valid: false`", body = CouponValidation),
        (status = 400, description = "Validation error")
    )
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<ValidateCoupon>,
) -> AppResult<ApiResponse<CouponValidation>> {
    let verdict = state.services.coupons().validate_coupon(&ctx, payload).await?;
    Ok(ApiResponse::success(verdict))
}

pub async fn create_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<CreateCoupon>,
) -> AppResult<Created<Coupon>> {
    let coupon = state.services.coupons().create_coupon(&ctx, payload).await?;
    Ok(Created(coupon))
}

pub async fn list_coupons(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<Coupon>>> {
    let coupons = state
        .services
        .coupons()
        .list_coupons(&ctx, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(coupons))
}

pub async fn get_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Coupon>> {
    let coupon = state.services.coupons().get_coupon(&ctx, id).await?;
    Ok(ApiResponse::success(coupon))
}

pub async fn update_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCoupon>,
) -> AppResult<ApiResponse<Coupon>> {
    let coupon = state.services.coupons().update_coupon(&ctx, id, payload).await?;
    Ok(ApiResponse::with_message(coupon, "Coupon updated"))
}

/// Deletes an unused coupon; a coupon already used on orders is deactivated
pub async fn delete_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    let message = match state.services.coupons().delete_coupon(&ctx, id).await? {
        CouponRemoval::Deleted => "Coupon deleted",
        CouponRemoval::Deactivated => "Coupon has been used on orders and was deactivated",
    };
    Ok(ApiResponse::message(message))
}
