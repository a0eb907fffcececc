//! Shopping cart handlers. Every call works on the caller's own cart.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{AddCartItem, CartView, TenantContext, UpdateCartItem};
use crate::errors::AppResult;
use crate::types::ApiResponse;

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:product_id", put(update_item).delete(remove_item))
}

pub async fn get_cart(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<CartView>> {
    let cart = state.services.carts().get_cart(&ctx).await?;
    Ok(ApiResponse::success(cart))
}

pub async fn add_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<AddCartItem>,
) -> AppResult<ApiResponse<CartView>> {
    let cart = state.services.carts().add_item(&ctx, payload).await?;
    Ok(ApiResponse::with_message(cart, "Item added to cart"))
}

/// Quantity 0 removes the line
pub async fn update_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(product_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCartItem>,
) -> AppResult<ApiResponse<CartView>> {
    let cart = state
        .services
        .carts()
        .update_item(&ctx, product_id, payload)
        .await?;

    Ok(ApiResponse::success(cart))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(product_id): Path<Uuid>,
) -> AppResult<ApiResponse<CartView>> {
    let cart = state.services.carts().remove_item(&ctx, product_id).await?;
    Ok(ApiResponse::with_message(cart, "Item removed from cart"))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<CartView>> {
    let cart = state.services.carts().clear(&ctx).await?;
    Ok(ApiResponse::with_message(cart, "Cart cleared"))
}
