//! Discount coupon entity.

use sea_orm::entity::prelude::*;

use crate::domain::Coupon;
use policy::DiscountType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Always stored uppercase
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub min_order_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTimeUtc>,
    pub expires_at: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Coupon {
    fn from(model: Model) -> Self {
        Coupon {
            id: model.id,
            discount_type: super::parse_column(&model.discount_type, DiscountType::FixedAmount, "coupons.discount_type"),
            code: model.code,
            description: model.description,
            discount_value: model.discount_value,
            min_order_amount: model.min_order_amount,
            max_uses: model.max_uses,
            used_count: model.used_count,
            starts_at: model.starts_at,
            expires_at: model.expires_at,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
