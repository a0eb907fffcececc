//! Cart service - One active cart per tenant user.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{AddCartItem, CartLine, CartView, ShopProduct, TenantContext, UpdateCartItem};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::{CartHandle, CartLineRow};
use crate::infra::{Repos, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartService: Send + Sync {
    /// The caller's cart, opened on first use
    async fn get_cart(&self, ctx: &TenantContext) -> AppResult<CartView>;

    /// Add to the cart, merging with an existing line for the same product
    async fn add_item(&self, ctx: &TenantContext, input: AddCartItem) -> AppResult<CartView>;

    /// Overwrite a line's quantity. Zero removes the line.
    async fn update_item(&self, ctx: &TenantContext, product_id: Uuid, input: UpdateCartItem) -> AppResult<CartView>;

    async fn remove_item(&self, ctx: &TenantContext, product_id: Uuid) -> AppResult<CartView>;

    async fn clear(&self, ctx: &TenantContext) -> AppResult<CartView>;
}

pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

/// A product that can be put in a cart right now
async fn purchasable<C: ConnectionTrait>(
    repos: Repos<'_, C>,
    tenant_id: Uuid,
    product_id: Uuid,
) -> AppResult<ShopProduct> {
    let product = repos
        .shop_products()
        .find(tenant_id, product_id)
        .await?
        .ok_or_not_found("Product")?;
    if !product.is_active {
        return Err(AppError::validation("Product is not available"));
    }
    Ok(product)
}

fn ensure_in_stock(product: &ShopProduct, quantity: i32) -> AppResult<()> {
    if quantity > product.stock {
        return Err(AppError::validation(format!(
            "Only {} of {} in stock",
            product.stock, product.name
        )));
    }
    Ok(())
}

/// Price the stored lines against the current catalog. Lines whose product
/// has since been deleted are left out.
async fn render_cart<C: ConnectionTrait>(
    repos: Repos<'_, C>,
    tenant_id: Uuid,
    cart: &CartHandle,
) -> AppResult<CartView> {
    let rows = repos.carts().lines(cart).await?;
    let ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
    let products = repos.shop_products().find_many(tenant_id, &ids).await?;
    Ok(price_lines(cart, &rows, products))
}

fn price_lines(cart: &CartHandle, rows: &[CartLineRow], products: Vec<ShopProduct>) -> CartView {
    let mut by_id: HashMap<Uuid, ShopProduct> = products.into_iter().map(|p| (p.id, p)).collect();

    let items: Vec<CartLine> = rows
        .iter()
        .filter_map(|row| {
            let product = by_id.remove(&row.product_id)?;
            Some(CartLine {
                product_id: product.id,
                line_total: product.price * Decimal::from(row.quantity),
                name: product.name,
                unit_price: product.price,
                quantity: row.quantity,
                available_stock: product.stock,
            })
        })
        .collect();

    CartView {
        id: cart.id,
        item_count: items.iter().map(|l| l.quantity).sum(),
        subtotal: items.iter().map(|l| l.line_total).sum(),
        items,
        expires_at: cart.expires_at,
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn get_cart(&self, ctx: &TenantContext) -> AppResult<CartView> {
        let repos = self.uow.repos();
        let cart = repos.carts().open(ctx.tenant_id, ctx.user_id).await?;
        render_cart(repos, ctx.tenant_id, &cart).await
    }

    async fn add_item(&self, ctx: &TenantContext, input: AddCartItem) -> AppResult<CartView> {
        let repos = self.uow.repos();
        let product = purchasable(repos, ctx.tenant_id, input.product_id).await?;

        let cart = repos.carts().open(ctx.tenant_id, ctx.user_id).await?;
        let existing = repos.carts().quantity_of(&cart, product.id).await?.unwrap_or(0);
        let quantity = existing + input.quantity;
        ensure_in_stock(&product, quantity)?;

        repos.carts().set_quantity(&cart, product.id, quantity).await?;
        render_cart(repos, ctx.tenant_id, &cart).await
    }

    async fn update_item(&self, ctx: &TenantContext, product_id: Uuid, input: UpdateCartItem) -> AppResult<CartView> {
        let repos = self.uow.repos();
        let cart = repos.carts().open(ctx.tenant_id, ctx.user_id).await?;

        if repos.carts().quantity_of(&cart, product_id).await?.is_none() {
            return Err(AppError::NotFound("Cart item"));
        }

        if input.quantity == 0 {
            repos.carts().remove(&cart, product_id).await?;
        } else {
            let product = purchasable(repos, ctx.tenant_id, product_id).await?;
            ensure_in_stock(&product, input.quantity)?;
            repos.carts().set_quantity(&cart, product_id, input.quantity).await?;
        }
        render_cart(repos, ctx.tenant_id, &cart).await
    }

    async fn remove_item(&self, ctx: &TenantContext, product_id: Uuid) -> AppResult<CartView> {
        let repos = self.uow.repos();
        let cart = repos.carts().open(ctx.tenant_id, ctx.user_id).await?;

        if !repos.carts().remove(&cart, product_id).await? {
            return Err(AppError::NotFound("Cart item"));
        }
        render_cart(repos, ctx.tenant_id, &cart).await
    }

    async fn clear(&self, ctx: &TenantContext) -> AppResult<CartView> {
        let repos = self.uow.repos();
        let cart = repos.carts().open(ctx.tenant_id, ctx.user_id).await?;
        repos.carts().clear(&cart).await?;
        render_cart(repos, ctx.tenant_id, &cart).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(price: i64, stock: i32) -> ShopProduct {
        ShopProduct {
            id: Uuid::new_v4(),
            category_id: None,
            name: "Mug".into(),
            slug: "mug".into(),
            description: None,
            price: Decimal::from(price),
            compare_at_price: None,
            sku: None,
            stock,
            low_stock_threshold: 5,
            is_active: true,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_totals_skip_deleted_products() {
        let cart = CartHandle {
            id: Uuid::new_v4(),
            expires_at: Utc::now(),
        };
        let mug = product(12, 10);
        let rows = vec![
            CartLineRow {
                product_id: mug.id,
                quantity: 3,
            },
            CartLineRow {
                product_id: Uuid::new_v4(),
                quantity: 2,
            },
        ];

        let view = price_lines(&cart, &rows, vec![mug]);

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, Decimal::from(36));
    }

    #[test]
    fn test_quantity_above_stock_rejected() {
        let mug = product(12, 2);
        assert!(ensure_in_stock(&mug, 2).is_ok());
        assert!(ensure_in_stock(&mug, 3).is_err());
    }
}
