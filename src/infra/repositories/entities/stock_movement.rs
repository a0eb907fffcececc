//! Stock movement ledger entity.

use sea_orm::entity::prelude::*;

use crate::domain::{MovementType, StockMovement};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub movement_type: String,
    /// Signed change applied to stock
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub reason: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StockMovement {
    fn from(model: Model) -> Self {
        StockMovement {
            id: model.id,
            product_id: model.product_id,
            movement_type: super::parse_column(&model.movement_type, MovementType::Adjustment, "stock_movements.movement_type"),
            quantity: model.quantity,
            previous_stock: model.previous_stock,
            new_stock: model.new_stock,
            reason: model.reason,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}
