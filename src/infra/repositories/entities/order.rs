//! Order header entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Order, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub status: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub shipping_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total: Decimal,
    pub coupon_id: Option<Uuid>,
    pub coupon_code: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub shipping_address: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub billing_address: Json,
    pub notes: Option<String>,
    pub shipped_at: Option<DateTimeUtc>,
    pub delivered_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        Order {
            id: model.id,
            user_id: model.user_id,
            status: super::parse_column(&model.status, OrderStatus::Pending, "orders.status"),
            order_number: model.order_number,
            subtotal: model.subtotal,
            discount_amount: model.discount_amount,
            tax_amount: model.tax_amount,
            shipping_amount: model.shipping_amount,
            total: model.total,
            coupon_code: model.coupon_code,
            shipping_address: model.shipping_address,
            billing_address: model.billing_address,
            notes: model.notes,
            shipped_at: model.shipped_at,
            delivered_at: model.delivered_at,
            cancelled_at: model.cancelled_at,
            items: Vec::new(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
