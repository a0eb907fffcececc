//! Inventory service - Stock-keeping products and their movement ledger.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use super::entitlements;
use crate::domain::{
    AdjustStock, CategoryCount, CreateInventoryProduct, InventoryFilter, InventoryProduct,
    InventoryStats, MovementType, StockMovement, TenantContext, UpdateInventoryProduct,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::NewMovement;
use crate::infra::UnitOfWork;
use crate::types::Paginated;
use crate::with_transaction;
use policy::LimitKey;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const SKU_TAKEN: &str = "A product with this SKU already exists";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Create a product, subject to the plan's `maxProducts`
    async fn create_product(
        &self,
        ctx: &TenantContext,
        input: CreateInventoryProduct,
    ) -> AppResult<InventoryProduct>;

    async fn list_products(
        &self,
        ctx: &TenantContext,
        filter: InventoryFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<InventoryProduct>>;

    async fn get_product(&self, ctx: &TenantContext, id: Uuid) -> AppResult<InventoryProduct>;

    async fn update_product(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateInventoryProduct,
    ) -> AppResult<InventoryProduct>;

    async fn delete_product(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()>;

    async fn low_stock(&self, ctx: &TenantContext) -> AppResult<Vec<InventoryProduct>>;

    async fn stats(&self, ctx: &TenantContext) -> AppResult<InventoryStats>;

    /// Apply a signed stock change and log it. Stock never goes negative.
    async fn adjust_stock(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: AdjustStock,
    ) -> AppResult<InventoryProduct>;

    async fn movements(
        &self,
        ctx: &TenantContext,
        product_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<StockMovement>>;
}

pub struct InventoryManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> InventoryManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> InventoryService for InventoryManager<U> {
    async fn create_product(
        &self,
        ctx: &TenantContext,
        input: CreateInventoryProduct,
    ) -> AppResult<InventoryProduct> {
        if input.stock < 0 {
            return Err(AppError::validation("Initial stock cannot be negative"));
        }
        let (tenant_id, user_id) = (ctx.tenant_id, ctx.user_id);

        let product = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let (tenant, plan) = entitlements::lock_tenant(repos, tenant_id).await?;
            let current = entitlements::product_count(repos, tenant_id).await?;
            entitlements::ensure_capacity(&tenant, &plan, LimitKey::MaxProducts, current)?;

            if let Some(sku) = input.sku.as_deref() {
                if repos.inventory().sku_taken(tenant_id, sku, None).await? {
                    return Err(AppError::conflict(SKU_TAKEN));
                }
            }

            let initial = input.stock;
            let product = repos.inventory().create(tenant_id, input).await?;

            if initial > 0 {
                repos
                    .movements()
                    .record(
                        tenant_id,
                        NewMovement {
                            product_id: product.id,
                            movement_type: MovementType::Adjustment,
                            quantity: initial,
                            previous_stock: 0,
                            new_stock: initial,
                            reason: Some("Initial stock".to_string()),
                            created_by: Some(user_id),
                        },
                    )
                    .await?;
            }

            Ok(product)
        })?;

        tracing::info!(tenant_id = %tenant_id, product_id = %product.id, "Inventory product created");
        Ok(product)
    }

    async fn list_products(
        &self,
        ctx: &TenantContext,
        filter: InventoryFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<InventoryProduct>> {
        self.uow
            .repos()
            .inventory()
            .list(ctx.tenant_id, &filter, page, limit)
            .await
    }

    async fn get_product(&self, ctx: &TenantContext, id: Uuid) -> AppResult<InventoryProduct> {
        self.uow
            .repos()
            .inventory()
            .find(ctx.tenant_id, id)
            .await?
            .ok_or_not_found("Product")
    }

    async fn update_product(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateInventoryProduct,
    ) -> AppResult<InventoryProduct> {
        let repos = self.uow.repos();
        if let Some(sku) = input.sku.as_deref() {
            if repos.inventory().sku_taken(ctx.tenant_id, sku, Some(id)).await? {
                return Err(AppError::conflict(SKU_TAKEN));
            }
        }
        repos.inventory().update(ctx.tenant_id, id, input).await
    }

    async fn delete_product(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()> {
        self.uow.repos().inventory().delete(ctx.tenant_id, id).await
    }

    async fn low_stock(&self, ctx: &TenantContext) -> AppResult<Vec<InventoryProduct>> {
        self.uow.repos().inventory().low_stock(ctx.tenant_id).await
    }

    async fn stats(&self, ctx: &TenantContext) -> AppResult<InventoryStats> {
        let products = self.uow.repos().inventory().all(ctx.tenant_id).await?;
        Ok(summarize(&products))
    }

    async fn adjust_stock(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: AdjustStock,
    ) -> AppResult<InventoryProduct> {
        if input.quantity == 0 {
            return Err(AppError::validation("Quantity must not be zero"));
        }
        let (tenant_id, user_id) = (ctx.tenant_id, ctx.user_id);

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let before = repos
                .inventory()
                .find(tenant_id, id)
                .await?
                .ok_or_not_found("Product")?;

            if !repos.inventory().apply_stock_delta(tenant_id, id, input.quantity).await? {
                return Err(AppError::validation("Insufficient stock"));
            }

            let after = repos
                .inventory()
                .find(tenant_id, id)
                .await?
                .ok_or_not_found("Product")?;

            repos
                .movements()
                .record(
                    tenant_id,
                    NewMovement {
                        product_id: id,
                        movement_type: input.movement_type,
                        quantity: input.quantity,
                        previous_stock: after.stock - input.quantity,
                        new_stock: after.stock,
                        reason: input.reason,
                        created_by: Some(user_id),
                    },
                )
                .await?;

            tracing::debug!(
                product_id = %id,
                from = before.stock,
                to = after.stock,
                "Stock adjusted"
            );
            Ok(after)
        })
    }

    async fn movements(
        &self,
        ctx: &TenantContext,
        product_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<StockMovement>> {
        if let Some(product_id) = product_id {
            self.get_product(ctx, product_id).await?;
        }
        self.uow
            .repos()
            .movements()
            .list(ctx.tenant_id, product_id, page, limit)
            .await
    }
}

fn summarize(products: &[InventoryProduct]) -> InventoryStats {
    let mut categories: BTreeMap<&str, u64> = BTreeMap::new();
    for product in products {
        if let Some(category) = product.category.as_deref() {
            *categories.entry(category).or_default() += 1;
        }
    }

    InventoryStats {
        total_products: products.len() as u64,
        low_stock_count: products.iter().filter(|p| p.is_low_stock).count() as u64,
        total_stock_units: products.iter().map(|p| p.stock as i64).sum(),
        total_value: products
            .iter()
            .map(|p| p.unit_price * Decimal::from(p.stock))
            .sum(),
        categories: categories
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(category: Option<&str>, price: i64, stock: i32, threshold: i32) -> InventoryProduct {
        InventoryProduct {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Widget".into(),
            sku: None,
            category: category.map(String::from),
            description: None,
            unit_price: Decimal::from(price),
            cost_price: None,
            stock,
            low_stock_threshold: threshold,
            unit: "pcs".into(),
            is_low_stock: stock <= threshold,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stats_value_is_stock_times_price() {
        let stats = summarize(&[
            product(Some("tools"), 5, 10, 2),
            product(Some("tools"), 3, 1, 2),
            product(None, 100, 0, 0),
        ]);

        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.low_stock_count, 2);
        assert_eq!(stats.total_stock_units, 11);
        assert_eq!(stats.total_value, Decimal::from(53));
        assert_eq!(stats.categories.len(), 1);
        assert_eq!(stats.categories[0].count, 2);
    }
}
