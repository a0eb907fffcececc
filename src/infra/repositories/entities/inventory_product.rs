//! Inventory product entity.

use sea_orm::entity::prelude::*;

use crate::domain::InventoryProduct;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub cost_price: Option<Decimal>,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub unit: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for InventoryProduct {
    fn from(model: Model) -> Self {
        InventoryProduct {
            is_low_stock: model.stock <= model.low_stock_threshold,
            id: model.id,
            tenant_id: model.tenant_id,
            name: model.name,
            sku: model.sku,
            category: model.category,
            description: model.description,
            unit_price: model.unit_price,
            cost_price: model.cost_price,
            stock: model.stock,
            low_stock_threshold: model.low_stock_threshold,
            unit: model.unit,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
