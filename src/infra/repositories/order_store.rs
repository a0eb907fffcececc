//! Orders and their line items.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde_json::Value;
use uuid::Uuid;

use super::entities::{order, order_item};
use super::fetch_page;
use crate::domain::{Order, OrderFilter, OrderItem, OrderStatus};
use crate::errors::AppResult;
use crate::types::Paginated;

/// An order about to be placed
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub order_number: String,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub coupon_id: Option<Uuid>,
    pub coupon_code: Option<String>,
    pub shipping_address: Value,
    pub billing_address: Value,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
}

pub struct OrderStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> OrderStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Insert the header and every line
    pub async fn create(&self, tenant_id: Uuid, new: NewOrder) -> AppResult<Order> {
        let now = Utc::now();
        let header = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            user_id: Set(new.user_id),
            order_number: Set(new.order_number),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            subtotal: Set(new.subtotal),
            discount_amount: Set(new.discount_amount),
            tax_amount: Set(Decimal::ZERO),
            shipping_amount: Set(Decimal::ZERO),
            total: Set(new.total),
            coupon_id: Set(new.coupon_id),
            coupon_code: Set(new.coupon_code),
            shipping_address: Set(new.shipping_address),
            billing_address: Set(new.billing_address),
            notes: Set(new.notes),
            shipped_at: Set(None),
            delivered_at: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        for item in &new.items {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(header.id),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name.clone()),
                unit_price: Set(item.unit_price),
                quantity: Set(item.quantity),
                total: Set(item.total),
                created_at: Set(now),
            }
            .insert(self.db)
            .await?;
        }

        let mut order = Order::from(header);
        order.items = new.items;
        Ok(order)
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Order>> {
        let Some(model) = order::Entity::find_by_id(id)
            .filter(order::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut order = Order::from(model);
        order.items = self.items_by_order(&[order.id]).await?.remove(&order.id).unwrap_or_default();
        Ok(Some(order))
    }

    /// Orders in the tenant, optionally only those placed by `user_id`
    pub async fn list(
        &self,
        tenant_id: Uuid,
        user_id: Option<Uuid>,
        filter: &OrderFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Order>> {
        let mut query = order::Entity::find()
            .filter(order::Column::TenantId.eq(tenant_id))
            .order_by_desc(order::Column::CreatedAt);
        if let Some(user_id) = user_id {
            query = query.filter(order::Column::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status.as_str()));
        }

        let page: Paginated<Order> = fetch_page(self.db, query, page, limit).await?;
        let ids: Vec<Uuid> = page.data.iter().map(|o| o.id).collect();
        let mut items = self.items_by_order(&ids).await?;

        Ok(page.map(|mut order| {
            order.items = items.remove(&order.id).unwrap_or_default();
            order
        }))
    }

    /// Move the order to `status` and stamp the matching timestamp, but only
    /// while its current status is one of `from`. Returns the updated order,
    /// or `None` when the guard did not match.
    pub async fn transition(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: &[OrderStatus],
        status: OrderStatus,
    ) -> AppResult<Option<Order>> {
        let now = Utc::now();
        let mut update = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(status.as_str()))
            .col_expr(order::Column::UpdatedAt, Expr::value(now));
        update = match status {
            OrderStatus::Shipped => update.col_expr(order::Column::ShippedAt, Expr::value(Some(now))),
            OrderStatus::Delivered => update.col_expr(order::Column::DeliveredAt, Expr::value(Some(now))),
            OrderStatus::Cancelled => update.col_expr(order::Column::CancelledAt, Expr::value(Some(now))),
            _ => update,
        };

        let result = update
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::TenantId.eq(tenant_id))
            .filter(order::Column::Status.is_in(from.iter().map(OrderStatus::as_str)))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find(tenant_id, id).await
    }

    pub async fn count_with_coupon(&self, tenant_id: Uuid, coupon_id: Uuid) -> AppResult<u64> {
        Ok(order::Entity::find()
            .filter(order::Column::TenantId.eq(tenant_id))
            .filter(order::Column::CouponId.eq(coupon_id))
            .count(self.db)
            .await?)
    }

    /// Every order in the tenant with its items, for sales reports
    pub async fn all_with_items(&self, tenant_id: Uuid) -> AppResult<Vec<Order>> {
        let models = order::Entity::find()
            .filter(order::Column::TenantId.eq(tenant_id))
            .all(self.db)
            .await?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut items = self.items_by_order(&ids).await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let mut order = Order::from(model);
                order.items = items.remove(&order.id).unwrap_or_default();
                order
            })
            .collect())
    }

    async fn items_by_order(&self, order_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<OrderItem>>> {
        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(grouped);
        }

        let rows = order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids.iter().copied()))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(self.db)
            .await?;
        for row in rows {
            grouped.entry(row.order_id).or_default().push(OrderItem::from(row));
        }
        Ok(grouped)
    }
}
