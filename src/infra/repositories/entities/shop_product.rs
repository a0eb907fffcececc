//! Store product entity.

use sea_orm::entity::prelude::*;

use crate::domain::ShopProduct;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shop_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub compare_at_price: Option<Decimal>,
    pub sku: Option<String>,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ShopProduct {
    fn from(model: Model) -> Self {
        ShopProduct {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            price: model.price,
            compare_at_price: model.compare_at_price,
            sku: model.sku,
            stock: model.stock,
            low_stock_threshold: model.low_stock_threshold,
            is_active: model.is_active,
            is_featured: model.is_featured,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
