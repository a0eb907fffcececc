//! Inventory module handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    AdjustStock, CreateInventoryProduct, InventoryFilter, InventoryProduct, InventoryStats,
    StockMovement, TenantContext, UpdateInventoryProduct,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MovementQuery {
    /// Only movements of this product
    pub product_id: Option<Uuid>,
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/stock", post(adjust_stock))
        .route("/low-stock", get(low_stock))
        .route("/stats", get(stats))
        .route("/stock-history", get(stock_history))
}

#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    request_body = CreateInventoryProduct,
    responses(
        (status = 201, description = "Product created", body = InventoryProduct),
        (status = 400, description = "Validation error"),
        (status = 409, description = "SKU taken or product limit reached")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<CreateInventoryProduct>,
) -> AppResult<Created<InventoryProduct>> {
    let product = state.services.inventory().create_product(&ctx, payload).await?;
    Ok(Created(product))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    params(PaginationParams, InventoryFilter),
    responses(
        (status = 200, description = "One page of products", body = Vec<InventoryProduct>)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<InventoryFilter>,
) -> AppResult<ApiResponse<Vec<InventoryProduct>>> {
    let products = state
        .services
        .inventory()
        .list_products(&ctx, filter, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(products))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = InventoryProduct),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<InventoryProduct>> {
    let product = state.services.inventory().get_product(&ctx, id).await?;
    Ok(ApiResponse::success(product))
}

#[utoipa::path(
    put,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateInventoryProduct,
    responses(
        (status = 200, description = "Product updated", body = InventoryProduct),
        (status = 404, description = "Product not found"),
        (status = 409, description = "SKU taken")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateInventoryProduct>,
) -> AppResult<ApiResponse<InventoryProduct>> {
    let product = state
        .services
        .inventory()
        .update_product(&ctx, id, payload)
        .await?;

    Ok(ApiResponse::with_message(product, "Product updated"))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.inventory().delete_product(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a stock movement and apply it to the product
#[utoipa::path(
    post,
    path = "/api/inventory/products/{id}/stock",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = AdjustStock,
    responses(
        (status = 200, description = "Stock adjusted", body = InventoryProduct),
        (status = 400, description = "Insufficient stock"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AdjustStock>,
) -> AppResult<ApiResponse<InventoryProduct>> {
    let product = state.services.inventory().adjust_stock(&ctx, id, payload).await?;
    Ok(ApiResponse::with_message(product, "Stock adjusted"))
}

#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Products at or below their threshold", body = Vec<InventoryProduct>)
    )
)]
pub async fn low_stock(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<Vec<InventoryProduct>>> {
    let products = state.services.inventory().low_stock(&ctx).await?;
    Ok(ApiResponse::success(products))
}

#[utoipa::path(
    get,
    path = "/api/inventory/stats",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inventory totals", body = InventoryStats)
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<InventoryStats>> {
    let stats = state.services.inventory().stats(&ctx).await?;
    Ok(ApiResponse::success(stats))
}

#[utoipa::path(
    get,
    path = "/api/inventory/stock-history",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    params(PaginationParams, MovementQuery),
    responses(
        (status = 200, description = "Stock movements, newest first", body = Vec<StockMovement>)
    )
)]
pub async fn stock_history(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
    Query(query): Query<MovementQuery>,
) -> AppResult<ApiResponse<Vec<StockMovement>>> {
    let movements = state
        .services
        .inventory()
        .movements(&ctx, query.product_id, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(movements))
}
