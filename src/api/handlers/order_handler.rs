//! Checkout, order management and sales analytics handlers.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use super::catalog_handler::LimitQuery;
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::DEFAULT_CUSTOMER_ORDER_PAGE_SIZE;
use crate::domain::{
    Checkout, Order, OrderFilter, SalesFilter, SalesSummary, TenantContext, TopProduct,
    UpdateOrderStatus,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/my-orders", get(my_orders))
        .route("/analytics/sales", get(sales_summary))
        .route("/analytics/top-products", get(top_products))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_status))
        .route("/:id/cancel", post(cancel_order))
}

/// Turn the caller's cart into an order
pub async fn checkout(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<Checkout>,
) -> AppResult<Created<Order>> {
    let order = state.services.orders().checkout(&ctx, payload).await?;
    Ok(Created(order))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<OrderFilter>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let orders = state
        .services
        .orders()
        .list_orders(&ctx, filter, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(orders))
}

pub async fn my_orders(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let orders = state
        .services
        .orders()
        .my_orders(
            &ctx,
            page.page(),
            page.limit_or(DEFAULT_CUSTOMER_ORDER_PAGE_SIZE),
        )
        .await?;

    Ok(ApiResponse::paginated(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.services.orders().get_order(&ctx, id).await?;
    Ok(ApiResponse::success(order))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatus>,
) -> AppResult<ApiResponse<Order>> {
    let order = state
        .services
        .orders()
        .update_status(&ctx, id, payload.status)
        .await?;

    Ok(ApiResponse::with_message(order, "Order status updated"))
}

/// Cancel and put the items back in stock
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.services.orders().cancel_order(&ctx, id).await?;
    Ok(ApiResponse::with_message(order, "Order cancelled"))
}

pub async fn sales_summary(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(filter): Query<SalesFilter>,
) -> AppResult<ApiResponse<SalesSummary>> {
    let summary = state.services.orders().sales_summary(&ctx, filter).await?;
    Ok(ApiResponse::success(summary))
}

pub async fn top_products(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<LimitQuery>,
) -> AppResult<ApiResponse<Vec<TopProduct>>> {
    let products = state
        .services
        .orders()
        .top_products(&ctx, Some(query.limit_or_default()))
        .await?;

    Ok(ApiResponse::success(products))
}
