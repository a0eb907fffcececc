//! Store categories and products.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::{category, shop_product as product};
use super::{contains_ci, fetch_page};
use crate::config::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::domain::{
    Category, CreateCategory, CreateShopProduct, ShopProduct, ShopProductFilter, UpdateCategory,
    UpdateShopProduct,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::Paginated;

pub struct CategoryStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> CategoryStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Category>> {
        let model = category::Entity::find_by_id(id)
            .filter(category::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;
        Ok(model.map(Category::from))
    }

    pub async fn find_by_slug(&self, tenant_id: Uuid, slug: &str) -> AppResult<Option<Category>> {
        let model = category::Entity::find()
            .filter(category::Column::TenantId.eq(tenant_id))
            .filter(category::Column::Slug.eq(slug))
            .one(self.db)
            .await?;
        Ok(model.map(Category::from))
    }

    pub async fn slug_taken(&self, tenant_id: Uuid, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = category::Entity::find()
            .filter(category::Column::TenantId.eq(tenant_id))
            .filter(category::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(category::Column::Id.ne(id));
        }
        Ok(query.count(self.db).await? > 0)
    }

    pub async fn create(&self, tenant_id: Uuid, input: CreateCategory) -> AppResult<Category> {
        let now = Utc::now();
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            parent_id: Set(input.parent_id),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            sort_order: Set(input.sort_order),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(Category::from(model))
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateCategory) -> AppResult<Category> {
        let model = category::Entity::find_by_id(id)
            .filter(category::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .ok_or_not_found("Category")?;

        let mut active: category::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(Some(parent_id));
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(sort_order) = input.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(Category::from(active.update(self.db).await?))
    }

    pub async fn set_sort_order(&self, tenant_id: Uuid, id: Uuid, sort_order: i32) -> AppResult<()> {
        let result = category::Entity::update_many()
            .col_expr(category::Column::SortOrder, Expr::value(sort_order))
            .col_expr(category::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(category::Column::Id.eq(id))
            .filter(category::Column::TenantId.eq(tenant_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Category"));
        }
        Ok(())
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = category::Entity::delete_many()
            .filter(category::Column::Id.eq(id))
            .filter(category::Column::TenantId.eq(tenant_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Category"));
        }
        Ok(())
    }

    /// All categories, ordered for display
    pub async fn all(&self, tenant_id: Uuid) -> AppResult<Vec<Category>> {
        let models = category::Entity::find()
            .filter(category::Column::TenantId.eq(tenant_id))
            .order_by_asc(category::Column::SortOrder)
            .order_by_asc(category::Column::Name)
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn count_children(&self, tenant_id: Uuid, id: Uuid) -> AppResult<u64> {
        Ok(category::Entity::find()
            .filter(category::Column::TenantId.eq(tenant_id))
            .filter(category::Column::ParentId.eq(id))
            .count(self.db)
            .await?)
    }
}

pub struct ShopProductStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> ShopProductStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<ShopProduct>> {
        let model = product::Entity::find_by_id(id)
            .filter(product::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;
        Ok(model.map(ShopProduct::from))
    }

    pub async fn find_by_slug(&self, tenant_id: Uuid, slug: &str) -> AppResult<Option<ShopProduct>> {
        let model = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(product::Column::Slug.eq(slug))
            .one(self.db)
            .await?;
        Ok(model.map(ShopProduct::from))
    }

    pub async fn find_many(&self, tenant_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<ShopProduct>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(ShopProduct::from).collect())
    }

    pub async fn slug_taken(&self, tenant_id: Uuid, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(product::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(product::Column::Id.ne(id));
        }
        Ok(query.count(self.db).await? > 0)
    }

    pub async fn create(&self, tenant_id: Uuid, input: CreateShopProduct) -> AppResult<ShopProduct> {
        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            category_id: Set(input.category_id),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            price: Set(input.price),
            compare_at_price: Set(input.compare_at_price),
            sku: Set(input.sku),
            stock: Set(input.stock),
            low_stock_threshold: Set(input.low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)),
            is_active: Set(input.is_active.unwrap_or(true)),
            is_featured: Set(input.is_featured.unwrap_or(false)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(ShopProduct::from(model))
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateShopProduct) -> AppResult<ShopProduct> {
        let model = product::Entity::find_by_id(id)
            .filter(product::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .ok_or_not_found("Product")?;

        let mut active: product::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(compare_at) = input.compare_at_price {
            active.compare_at_price = Set(Some(compare_at));
        }
        if let Some(sku) = input.sku {
            active.sku = Set(Some(sku));
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(threshold) = input.low_stock_threshold {
            active.low_stock_threshold = Set(threshold);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(is_featured) = input.is_featured {
            active.is_featured = Set(is_featured);
        }
        active.updated_at = Set(Utc::now());

        Ok(ShopProduct::from(active.update(self.db).await?))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = product::Entity::delete_many()
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::TenantId.eq(tenant_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Product"));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &ShopProductFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<ShopProduct>> {
        let mut query = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .order_by_desc(product::Column::CreatedAt);

        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(product::Column::IsActive.eq(is_active));
        }
        if let Some(is_featured) = filter.is_featured {
            query = query.filter(product::Column::IsFeatured.eq(is_featured));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(product::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(product::Column::Price.lte(max));
        }
        match filter.in_stock {
            Some(true) => query = query.filter(product::Column::Stock.gt(0)),
            Some(false) => query = query.filter(product::Column::Stock.lte(0)),
            None => {}
        }
        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.filter(
                contains_ci(product::Column::Name, term)
                    .or(contains_ci(product::Column::Description, term)),
            );
        }

        fetch_page(self.db, query, page, limit).await
    }

    /// Active featured products, newest first
    pub async fn featured(&self, tenant_id: Uuid, limit: u64) -> AppResult<Vec<ShopProduct>> {
        let models = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(product::Column::IsActive.eq(true))
            .filter(product::Column::IsFeatured.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .limit(limit)
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(ShopProduct::from).collect())
    }

    pub async fn low_stock(&self, tenant_id: Uuid) -> AppResult<Vec<ShopProduct>> {
        let models = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(Expr::col(product::Column::Stock).lte(Expr::col(product::Column::LowStockThreshold)))
            .order_by_asc(product::Column::Stock)
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(ShopProduct::from).collect())
    }

    /// Counted against `maxProducts`
    pub async fn count(&self, tenant_id: Uuid) -> AppResult<u64> {
        Ok(product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await?)
    }

    pub async fn count_in_category(&self, tenant_id: Uuid, category_id: Uuid) -> AppResult<u64> {
        Ok(product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(product::Column::CategoryId.eq(category_id))
            .count(self.db)
            .await?)
    }

    pub async fn set_stock(&self, tenant_id: Uuid, id: Uuid, stock: i32) -> AppResult<()> {
        let result = product::Entity::update_many()
            .col_expr(product::Column::Stock, Expr::value(stock))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::TenantId.eq(tenant_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Product"));
        }
        Ok(())
    }

    /// Guarded `stock += delta`; false when the row is missing or stock would
    /// drop below zero.
    pub async fn apply_stock_delta(&self, tenant_id: Uuid, id: Uuid, delta: i32) -> AppResult<bool> {
        let result = product::Entity::update_many()
            .col_expr(product::Column::Stock, Expr::col(product::Column::Stock).add(delta))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(Expr::col(product::Column::Stock).gte(-delta))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
