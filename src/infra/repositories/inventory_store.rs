//! Inventory products and the stock movement ledger.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{inventory_product as product, stock_movement as movement};
use super::{contains_ci, fetch_page};
use crate::config::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::domain::{
    CreateInventoryProduct, InventoryFilter, InventoryProduct, MovementType, StockMovement,
    UpdateInventoryProduct,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::Paginated;

pub struct InventoryStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> InventoryStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<InventoryProduct>> {
        let model = product::Entity::find_by_id(id)
            .filter(product::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;
        Ok(model.map(InventoryProduct::from))
    }

    pub async fn sku_taken(&self, tenant_id: Uuid, sku: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(product::Column::Sku.eq(sku));
        if let Some(id) = except {
            query = query.filter(product::Column::Id.ne(id));
        }
        Ok(query.count(self.db).await? > 0)
    }

    pub async fn create(&self, tenant_id: Uuid, input: CreateInventoryProduct) -> AppResult<InventoryProduct> {
        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name),
            sku: Set(input.sku),
            category: Set(input.category),
            description: Set(input.description),
            unit_price: Set(input.unit_price),
            cost_price: Set(input.cost_price),
            stock: Set(input.stock),
            low_stock_threshold: Set(input.low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)),
            unit: Set(input.unit.unwrap_or_else(|| "pcs".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(InventoryProduct::from(model))
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateInventoryProduct,
    ) -> AppResult<InventoryProduct> {
        let model = product::Entity::find_by_id(id)
            .filter(product::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .ok_or_not_found("Product")?;

        let mut active: product::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(sku) = input.sku {
            active.sku = Set(Some(sku));
        }
        if let Some(category) = input.category {
            active.category = Set(Some(category));
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(unit_price) = input.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(cost_price) = input.cost_price {
            active.cost_price = Set(Some(cost_price));
        }
        if let Some(threshold) = input.low_stock_threshold {
            active.low_stock_threshold = Set(threshold);
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        active.updated_at = Set(Utc::now());

        Ok(InventoryProduct::from(active.update(self.db).await?))
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
        filter: &InventoryFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<InventoryProduct>> {
        let mut query = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .order_by_asc(product::Column::Name);

        if let Some(category) = &filter.category {
            query = query.filter(product::Column::Category.eq(category.as_str()));
        }
        if filter.low_stock == Some(true) {
            query = query.filter(
                Expr::col(product::Column::Stock).lte(Expr::col(product::Column::LowStockThreshold)),
            );
        }
        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.filter(
                contains_ci(product::Column::Name, term).or(contains_ci(product::Column::Sku, term)),
            );
        }

        fetch_page(self.db, query, page, limit).await
    }

    pub async fn low_stock(&self, tenant_id: Uuid) -> AppResult<Vec<InventoryProduct>> {
        let models = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(Expr::col(product::Column::Stock).lte(Expr::col(product::Column::LowStockThreshold)))
            .order_by_asc(product::Column::Stock)
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(InventoryProduct::from).collect())
    }

    pub async fn all(&self, tenant_id: Uuid) -> AppResult<Vec<InventoryProduct>> {
        let models = product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(InventoryProduct::from).collect())
    }

    /// Counted against `maxProducts`
    pub async fn count(&self, tenant_id: Uuid) -> AppResult<u64> {
        Ok(product::Entity::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await?)
    }

    /// Add `delta` to the stock in one guarded UPDATE. Returns false when the
    /// product does not exist in the tenant or the result would go negative.
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

/// A ledger row about to be written
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub reason: Option<String>,
    pub created_by: Option<Uuid>,
}

pub struct MovementStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> MovementStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn record(&self, tenant_id: Uuid, new: NewMovement) -> AppResult<StockMovement> {
        let model = movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            product_id: Set(new.product_id),
            movement_type: Set(new.movement_type.as_str().to_string()),
            quantity: Set(new.quantity),
            previous_stock: Set(new.previous_stock),
            new_stock: Set(new.new_stock),
            reason: Set(new.reason),
            created_by: Set(new.created_by),
            created_at: Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        Ok(StockMovement::from(model))
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        product_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<StockMovement>> {
        let mut query = movement::Entity::find()
            .filter(movement::Column::TenantId.eq(tenant_id))
            .order_by_desc(movement::Column::CreatedAt);
        if let Some(product_id) = product_id {
            query = query.filter(movement::Column::ProductId.eq(product_id));
        }

        fetch_page(self.db, query, page, limit).await
    }
}
