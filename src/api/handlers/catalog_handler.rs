//! Storefront catalog handlers: categories and products.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::{DEFAULT_TOP_LIMIT, MAX_PAGE_SIZE};
use crate::domain::{
    Category, CategoryNode, CreateCategory, CreateShopProduct, ReorderCategories, SetStock,
    ShopProduct, ShopProductFilter, TenantContext, UpdateCategory, UpdateShopProduct,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

/// `?limit=` for short ranked lists
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

impl LimitQuery {
    pub fn limit_or_default(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_PAGE_SIZE)
    }
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/tree", get(category_tree))
        .route("/reorder", put(reorder_categories))
        .route("/slug/:slug", get(category_by_slug))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/featured", get(featured_products))
        .route("/low-stock", get(low_stock_products))
        .route("/slug/:slug", get(product_by_slug))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/stock", put(set_stock))
}

// =============================================================================
// Categories
// =============================================================================

pub async fn create_category(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<CreateCategory>,
) -> AppResult<Created<Category>> {
    let category = state.services.catalog().create_category(&ctx, payload).await?;
    Ok(Created(category))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<Vec<Category>>> {
    let categories = state.services.catalog().list_categories(&ctx).await?;
    Ok(ApiResponse::success(categories))
}

pub async fn category_tree(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<Vec<CategoryNode>>> {
    let tree = state.services.catalog().category_tree(&ctx).await?;
    Ok(ApiResponse::success(tree))
}

pub async fn get_category(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Category>> {
    let category = state.services.catalog().get_category(&ctx, id).await?;
    Ok(ApiResponse::success(category))
}

pub async fn category_by_slug(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<Category>> {
    let category = state.services.catalog().category_by_slug(&ctx, slug).await?;
    Ok(ApiResponse::success(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCategory>,
) -> AppResult<ApiResponse<Category>> {
    let category = state
        .services
        .catalog()
        .update_category(&ctx, id, payload)
        .await?;

    Ok(ApiResponse::with_message(category, "Category updated"))
}

pub async fn reorder_categories(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<ReorderCategories>,
) -> AppResult<ApiResponse<Vec<Category>>> {
    let categories = state.services.catalog().reorder_categories(&ctx, payload).await?;
    Ok(ApiResponse::with_message(categories, "Categories reordered"))
}

/// Blocked while the category has subcategories or products
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog().delete_category(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Products
// =============================================================================

pub async fn create_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<CreateShopProduct>,
) -> AppResult<Created<ShopProduct>> {
    let product = state.services.catalog().create_product(&ctx, payload).await?;
    Ok(Created(product))
}

pub async fn list_products(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<ShopProductFilter>,
) -> AppResult<ApiResponse<Vec<ShopProduct>>> {
    let products = state
        .services
        .catalog()
        .list_products(&ctx, filter, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(products))
}

pub async fn featured_products(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<LimitQuery>,
) -> AppResult<ApiResponse<Vec<ShopProduct>>> {
    let products = state
        .services
        .catalog()
        .featured_products(&ctx, query.limit_or_default())
        .await?;

    Ok(ApiResponse::success(products))
}

pub async fn low_stock_products(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<Vec<ShopProduct>>> {
    let products = state.services.catalog().low_stock_products(&ctx).await?;
    Ok(ApiResponse::success(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<ShopProduct>> {
    let product = state.services.catalog().get_product(&ctx, id).await?;
    Ok(ApiResponse::success(product))
}

pub async fn product_by_slug(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<ShopProduct>> {
    let product = state.services.catalog().product_by_slug(&ctx, slug).await?;
    Ok(ApiResponse::success(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateShopProduct>,
) -> AppResult<ApiResponse<ShopProduct>> {
    let product = state
        .services
        .catalog()
        .update_product(&ctx, id, payload)
        .await?;

    Ok(ApiResponse::with_message(product, "Product updated"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog().delete_product(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_stock(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SetStock>,
) -> AppResult<ApiResponse<ShopProduct>> {
    let product = state
        .services
        .catalog()
        .set_stock(&ctx, id, payload.stock)
        .await?;

    Ok(ApiResponse::with_message(product, "Stock updated"))
}
