//! Catalog service - Store categories and products.

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use std::sync::Arc;
use uuid::Uuid;

use super::entitlements;
use crate::domain::{
    Category, CategoryNode, CreateCategory, CreateShopProduct, ReorderCategories, ShopProduct,
    ShopProductFilter, TenantContext, UpdateCategory, UpdateShopProduct,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Repos, UnitOfWork};
use crate::types::Paginated;
use crate::utils::ensure_slug_format;
use crate::with_transaction;
use policy::LimitKey;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_category(&self, ctx: &TenantContext, input: CreateCategory) -> AppResult<Category>;

    async fn list_categories(&self, ctx: &TenantContext) -> AppResult<Vec<Category>>;

    /// Categories nested under their parents
    async fn category_tree(&self, ctx: &TenantContext) -> AppResult<Vec<CategoryNode>>;

    async fn get_category(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Category>;

    async fn category_by_slug(&self, ctx: &TenantContext, slug: String) -> AppResult<Category>;

    async fn update_category(&self, ctx: &TenantContext, id: Uuid, input: UpdateCategory) -> AppResult<Category>;

    /// Apply all sort positions or none
    async fn reorder_categories(&self, ctx: &TenantContext, input: ReorderCategories) -> AppResult<Vec<Category>>;

    async fn delete_category(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()>;

    /// Create a store product, subject to the plan's `maxProducts`
    async fn create_product(&self, ctx: &TenantContext, input: CreateShopProduct) -> AppResult<ShopProduct>;

    async fn list_products(
        &self,
        ctx: &TenantContext,
        filter: ShopProductFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<ShopProduct>>;

    async fn featured_products(&self, ctx: &TenantContext, limit: u64) -> AppResult<Vec<ShopProduct>>;

    async fn get_product(&self, ctx: &TenantContext, id: Uuid) -> AppResult<ShopProduct>;

    async fn product_by_slug(&self, ctx: &TenantContext, slug: String) -> AppResult<ShopProduct>;

    async fn update_product(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateShopProduct,
    ) -> AppResult<ShopProduct>;

    async fn delete_product(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()>;

    async fn low_stock_products(&self, ctx: &TenantContext) -> AppResult<Vec<ShopProduct>>;

    async fn set_stock(&self, ctx: &TenantContext, id: Uuid, stock: i32) -> AppResult<ShopProduct>;
}

pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

/// The category must exist in the tenant
async fn require_category<C: ConnectionTrait>(
    repos: Repos<'_, C>,
    tenant_id: Uuid,
    id: Uuid,
) -> AppResult<Category> {
    repos
        .categories()
        .find(tenant_id, id)
        .await?
        .ok_or_not_found("Category")
}

/// Whether `candidate` is `id` or one of its descendants
async fn is_descendant<C: ConnectionTrait>(
    repos: Repos<'_, C>,
    tenant_id: Uuid,
    id: Uuid,
    candidate: Uuid,
) -> AppResult<bool> {
    let mut cursor = Some(candidate);
    let mut hops = 0;
    while let Some(current) = cursor {
        if current == id {
            return Ok(true);
        }
        hops += 1;
        if hops > 64 {
            break;
        }
        cursor = repos
            .categories()
            .find(tenant_id, current)
            .await?
            .and_then(|c| c.parent_id);
    }
    Ok(false)
}

fn ensure_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::validation("Stock cannot be negative"));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn create_category(&self, ctx: &TenantContext, input: CreateCategory) -> AppResult<Category> {
        ensure_slug_format(&input.slug)?;
        let repos = self.uow.repos();

        if repos.categories().slug_taken(ctx.tenant_id, &input.slug, None).await? {
            return Err(AppError::conflict("Category slug already exists"));
        }
        if let Some(parent_id) = input.parent_id {
            require_category(repos, ctx.tenant_id, parent_id).await?;
        }

        repos.categories().create(ctx.tenant_id, input).await
    }

    async fn list_categories(&self, ctx: &TenantContext) -> AppResult<Vec<Category>> {
        self.uow.repos().categories().all(ctx.tenant_id).await
    }

    async fn category_tree(&self, ctx: &TenantContext) -> AppResult<Vec<CategoryNode>> {
        let categories = self.uow.repos().categories().all(ctx.tenant_id).await?;
        Ok(CategoryNode::tree(categories))
    }

    async fn get_category(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Category> {
        require_category(self.uow.repos(), ctx.tenant_id, id).await
    }

    async fn category_by_slug(&self, ctx: &TenantContext, slug: String) -> AppResult<Category> {
        self.uow
            .repos()
            .categories()
            .find_by_slug(ctx.tenant_id, &slug)
            .await?
            .ok_or_not_found("Category")
    }

    async fn update_category(&self, ctx: &TenantContext, id: Uuid, input: UpdateCategory) -> AppResult<Category> {
        let repos = self.uow.repos();
        require_category(repos, ctx.tenant_id, id).await?;

        if let Some(slug) = input.slug.as_deref() {
            ensure_slug_format(slug)?;
            if repos.categories().slug_taken(ctx.tenant_id, slug, Some(id)).await? {
                return Err(AppError::conflict("Category slug already exists"));
            }
        }
        if let Some(parent_id) = input.parent_id {
            if parent_id == id {
                return Err(AppError::validation("A category cannot be its own parent"));
            }
            require_category(repos, ctx.tenant_id, parent_id).await?;
            if is_descendant(repos, ctx.tenant_id, id, parent_id).await? {
                return Err(AppError::validation(
                    "A category cannot be moved under one of its subcategories",
                ));
            }
        }

        repos.categories().update(ctx.tenant_id, id, input).await
    }

    async fn reorder_categories(&self, ctx: &TenantContext, input: ReorderCategories) -> AppResult<Vec<Category>> {
        let tenant_id = ctx.tenant_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            for position in &input.categories {
                repos
                    .categories()
                    .set_sort_order(tenant_id, position.id, position.sort_order)
                    .await?;
            }
            Ok(())
        })?;

        self.list_categories(ctx).await
    }

    async fn delete_category(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()> {
        let tenant_id = ctx.tenant_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            require_category(repos, tenant_id, id).await?;

            if repos.categories().count_children(tenant_id, id).await? > 0 {
                return Err(AppError::conflict("Cannot delete category with subcategories"));
            }
            if repos.shop_products().count_in_category(tenant_id, id).await? > 0 {
                return Err(AppError::conflict("Cannot delete category with products"));
            }
            repos.categories().delete(tenant_id, id).await
        })
    }

    async fn create_product(&self, ctx: &TenantContext, input: CreateShopProduct) -> AppResult<ShopProduct> {
        ensure_slug_format(&input.slug)?;
        ensure_stock(input.stock)?;
        let tenant_id = ctx.tenant_id;

        let product = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let (tenant, plan) = entitlements::lock_tenant(repos, tenant_id).await?;
            let current = entitlements::product_count(repos, tenant_id).await?;
            entitlements::ensure_capacity(&tenant, &plan, LimitKey::MaxProducts, current)?;

            if repos.shop_products().slug_taken(tenant_id, &input.slug, None).await? {
                return Err(AppError::conflict("Product slug already exists"));
            }
            if let Some(category_id) = input.category_id {
                require_category(repos, tenant_id, category_id).await?;
            }

            repos.shop_products().create(tenant_id, input).await
        })?;

        tracing::info!(tenant_id = %tenant_id, product_id = %product.id, "Store product created");
        Ok(product)
    }

    async fn list_products(
        &self,
        ctx: &TenantContext,
        filter: ShopProductFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<ShopProduct>> {
        self.uow
            .repos()
            .shop_products()
            .list(ctx.tenant_id, &filter, page, limit)
            .await
    }

    async fn featured_products(&self, ctx: &TenantContext, limit: u64) -> AppResult<Vec<ShopProduct>> {
        self.uow.repos().shop_products().featured(ctx.tenant_id, limit).await
    }

    async fn get_product(&self, ctx: &TenantContext, id: Uuid) -> AppResult<ShopProduct> {
        self.uow
            .repos()
            .shop_products()
            .find(ctx.tenant_id, id)
            .await?
            .ok_or_not_found("Product")
    }

    async fn product_by_slug(&self, ctx: &TenantContext, slug: String) -> AppResult<ShopProduct> {
        self.uow
            .repos()
            .shop_products()
            .find_by_slug(ctx.tenant_id, &slug)
            .await?
            .ok_or_not_found("Product")
    }

    async fn update_product(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateShopProduct,
    ) -> AppResult<ShopProduct> {
        let repos = self.uow.repos();

        if let Some(slug) = input.slug.as_deref() {
            ensure_slug_format(slug)?;
            if repos.shop_products().slug_taken(ctx.tenant_id, slug, Some(id)).await? {
                return Err(AppError::conflict("Product slug already exists"));
            }
        }
        if let Some(category_id) = input.category_id {
            require_category(repos, ctx.tenant_id, category_id).await?;
        }
        if let Some(stock) = input.stock {
            ensure_stock(stock)?;
        }

        repos.shop_products().update(ctx.tenant_id, id, input).await
    }

    async fn delete_product(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()> {
        self.uow.repos().shop_products().delete(ctx.tenant_id, id).await
    }

    async fn low_stock_products(&self, ctx: &TenantContext) -> AppResult<Vec<ShopProduct>> {
        self.uow.repos().shop_products().low_stock(ctx.tenant_id).await
    }

    async fn set_stock(&self, ctx: &TenantContext, id: Uuid, stock: i32) -> AppResult<ShopProduct> {
        ensure_stock(stock)?;
        let repos = self.uow.repos();
        repos.shop_products().set_stock(ctx.tenant_id, id, stock).await?;
        self.get_product(ctx, id).await
    }
}
