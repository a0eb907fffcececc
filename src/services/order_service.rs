//! Order service - Checkout, fulfilment status and sales reporting.
//!
//! Checkout and cancellation each run in one transaction: the order, the
//! coupon usage, every stock change and the cart conversion commit together
//! or not at all.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::coupon_service::price_coupon;
use crate::config::DEFAULT_TOP_LIMIT;
use crate::domain::{
    Checkout, Coupon, Order, OrderFilter, OrderItem, OrderStatus, SalesFilter, SalesSummary,
    ShopProduct, TenantContext, TopProduct,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::NewOrder;
use crate::infra::UnitOfWork;
use crate::types::Paginated;
use crate::utils::order_number;
use crate::with_transaction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Turn the caller's active cart into a pending order
    async fn checkout(&self, ctx: &TenantContext, input: Checkout) -> AppResult<Order>;

    async fn list_orders(
        &self,
        ctx: &TenantContext,
        filter: OrderFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Order>>;

    /// Orders placed by the caller
    async fn my_orders(&self, ctx: &TenantContext, page: u64, limit: u64) -> AppResult<Paginated<Order>>;

    async fn get_order(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Order>;

    async fn update_status(&self, ctx: &TenantContext, id: Uuid, status: OrderStatus) -> AppResult<Order>;

    /// Cancel an order that has not shipped and put its stock back
    async fn cancel_order(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Order>;

    async fn sales_summary(&self, ctx: &TenantContext, filter: SalesFilter) -> AppResult<SalesSummary>;

    async fn top_products(&self, ctx: &TenantContext, limit: Option<u64>) -> AppResult<Vec<TopProduct>>;
}

pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn order_line(product: &ShopProduct, quantity: i32) -> OrderItem {
    OrderItem {
        product_id: product.id,
        product_name: product.name.clone(),
        unit_price: product.price,
        quantity,
        total: product.price * Decimal::from(quantity),
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn checkout(&self, ctx: &TenantContext, input: Checkout) -> AppResult<Order> {
        let (tenant_id, user_id) = (ctx.tenant_id, ctx.user_id);
        let now = Utc::now();

        let order = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let cart = repos
                .carts()
                .find_active(tenant_id, user_id)
                .await?
                .ok_or_else(|| AppError::validation("Cart is empty"))?;
            let rows = repos.carts().lines(&cart).await?;
            if rows.is_empty() {
                return Err(AppError::validation("Cart is empty"));
            }
            // A concurrent checkout of the same cart waits here and then finds it converted
            if !repos.carts().mark_converted(&cart).await? {
                return Err(AppError::conflict("Cart has already been checked out"));
            }

            let ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
            let products: HashMap<Uuid, ShopProduct> = repos
                .shop_products()
                .find_many(tenant_id, &ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();

            let mut items = Vec::with_capacity(rows.len());
            for row in &rows {
                let product = products
                    .get(&row.product_id)
                    .filter(|p| p.is_active)
                    .ok_or_else(|| AppError::validation("A product in your cart is no longer available"))?;
                items.push(order_line(product, row.quantity));
            }
            let subtotal: Decimal = items.iter().map(|i| i.total).sum();

            let mut discount = Decimal::ZERO;
            let mut coupon: Option<Coupon> = None;
            if let Some(code) = input.coupon_code.as_deref() {
                let found = repos.coupons().find_by_code(tenant_id, code).await?;
                discount = price_coupon(found.as_ref(), subtotal, now)
                    .map_err(|rejection| AppError::validation(rejection.to_string()))?;
                coupon = found;
            }
            if let Some(coupon) = &coupon {
                if !repos.coupons().redeem(tenant_id, coupon.id).await? {
                    return Err(AppError::validation("Coupon usage limit reached"));
                }
            }

            for item in &items {
                if !repos
                    .shop_products()
                    .apply_stock_delta(tenant_id, item.product_id, -item.quantity)
                    .await?
                {
                    return Err(AppError::validation(format!(
                        "Insufficient stock for {}",
                        item.product_name
                    )));
                }
            }

            let billing_address = input
                .billing_address
                .unwrap_or_else(|| input.shipping_address.clone());
            let order = repos
                .orders()
                .create(
                    tenant_id,
                    NewOrder {
                        user_id,
                        order_number: order_number(now),
                        subtotal,
                        discount_amount: discount,
                        total: subtotal - discount,
                        coupon_id: coupon.as_ref().map(|c| c.id),
                        coupon_code: coupon.map(|c| c.code),
                        shipping_address: input.shipping_address,
                        billing_address,
                        notes: input.notes,
                        items,
                    },
                )
                .await?;

            Ok(order)
        })?;

        tracing::info!(
            tenant_id = %tenant_id,
            order_number = %order.order_number,
            total = %order.total,
            "Order placed"
        );
        Ok(order)
    }

    async fn list_orders(
        &self,
        ctx: &TenantContext,
        filter: OrderFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Order>> {
        self.uow
            .repos()
            .orders()
            .list(ctx.tenant_id, None, &filter, page, limit)
            .await
    }

    async fn my_orders(&self, ctx: &TenantContext, page: u64, limit: u64) -> AppResult<Paginated<Order>> {
        self.uow
            .repos()
            .orders()
            .list(ctx.tenant_id, Some(ctx.user_id), &OrderFilter::default(), page, limit)
            .await
    }

    async fn get_order(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Order> {
        self.uow
            .repos()
            .orders()
            .find(ctx.tenant_id, id)
            .await?
            .ok_or_not_found("Order")
    }

    async fn update_status(&self, ctx: &TenantContext, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        if status == OrderStatus::Cancelled {
            return self.cancel_order(ctx, id).await;
        }

        let order = self.get_order(ctx, id).await?;
        if order.status.is_terminal() {
            return Err(AppError::validation(format!(
                "Cannot change the status of a {} order",
                order.status
            )));
        }
        self.uow
            .repos()
            .orders()
            .transition(ctx.tenant_id, id, OrderStatus::OPEN, status)
            .await?
            .ok_or_else(|| AppError::conflict("Order status changed, please retry"))
    }

    async fn cancel_order(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Order> {
        let tenant_id = ctx.tenant_id;

        let order = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let order = repos
                .orders()
                .find(tenant_id, id)
                .await?
                .ok_or_not_found("Order")?;

            if !order.status.is_cancellable() {
                return Err(AppError::validation(format!(
                    "Cannot cancel a {} order",
                    order.status
                )));
            }

            let cancelled = repos
                .orders()
                .transition(tenant_id, id, OrderStatus::CANCELLABLE, OrderStatus::Cancelled)
                .await?
                .ok_or_else(|| AppError::conflict("Order status changed, please retry"))?;

            for item in &order.items {
                let restored = repos
                    .shop_products()
                    .apply_stock_delta(tenant_id, item.product_id, item.quantity)
                    .await?;
                if !restored {
                    tracing::warn!(
                        order_id = %id,
                        product_id = %item.product_id,
                        "Product no longer exists, stock not restored"
                    );
                }
            }
            Ok(cancelled)
        })?;

        tracing::info!(tenant_id = %tenant_id, order_number = %order.order_number, "Order cancelled");
        Ok(order)
    }

    async fn sales_summary(&self, ctx: &TenantContext, filter: SalesFilter) -> AppResult<SalesSummary> {
        let orders = self.uow.repos().orders().all_with_items(ctx.tenant_id).await?;
        Ok(summarize_sales(&orders, filter))
    }

    async fn top_products(&self, ctx: &TenantContext, limit: Option<u64>) -> AppResult<Vec<TopProduct>> {
        let orders = self.uow.repos().orders().all_with_items(ctx.tenant_id).await?;
        Ok(rank_products(&orders, limit.unwrap_or(DEFAULT_TOP_LIMIT) as usize))
    }
}

fn summarize_sales(orders: &[Order], filter: SalesFilter) -> SalesSummary {
    let counted: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status.counts_as_revenue())
        .filter(|o| filter.start_date.map_or(true, |start| o.created_at >= start))
        .filter(|o| filter.end_date.map_or(true, |end| o.created_at <= end))
        .collect();

    let total_revenue: Decimal = counted.iter().map(|o| o.total).sum();
    let order_count = counted.len() as u64;

    SalesSummary {
        total_revenue,
        order_count,
        average_order_value: if order_count == 0 {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(order_count)).round_dp(2)
        },
    }
}

/// Best sellers by revenue across orders that count as revenue
fn rank_products(orders: &[Order], limit: usize) -> Vec<TopProduct> {
    let mut totals: HashMap<Uuid, TopProduct> = HashMap::new();
    for item in orders
        .iter()
        .filter(|o| o.status.counts_as_revenue())
        .flat_map(|o| o.items.iter())
    {
        let entry = totals.entry(item.product_id).or_insert_with(|| TopProduct {
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity_sold: 0,
            revenue: Decimal::ZERO,
        });
        entry.quantity_sold += i64::from(item.quantity);
        entry.revenue += item.total;
    }

    let mut ranked: Vec<TopProduct> = totals.into_values().collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn order(status: OrderStatus, items: Vec<OrderItem>, days_ago: i64) -> Order {
        let total = items.iter().map(|i| i.total).sum();
        let created_at = Utc::now() - Duration::days(days_ago);
        Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            order_number: "ORD-TEST-0000".into(),
            status,
            subtotal: total,
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            shipping_amount: Decimal::ZERO,
            total,
            coupon_code: None,
            shipping_address: json!({"city": "Lagos"}),
            billing_address: json!({"city": "Lagos"}),
            notes: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            items,
            created_at,
            updated_at: created_at,
        }
    }

    fn item(product_id: Uuid, name: &str, price: i64, quantity: i32) -> OrderItem {
        OrderItem {
            product_id,
            product_name: name.into(),
            unit_price: Decimal::from(price),
            quantity,
            total: Decimal::from(price * i64::from(quantity)),
        }
    }

    #[test]
    fn test_sales_exclude_cancelled_and_refunded() {
        let p = Uuid::new_v4();
        let orders = vec![
            order(OrderStatus::Pending, vec![item(p, "Mug", 10, 2)], 1),
            order(OrderStatus::Delivered, vec![item(p, "Mug", 10, 1)], 1),
            order(OrderStatus::Cancelled, vec![item(p, "Mug", 10, 5)], 1),
            order(OrderStatus::Refunded, vec![item(p, "Mug", 10, 5)], 1),
        ];

        let summary = summarize_sales(&orders, SalesFilter::default());

        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.total_revenue, Decimal::from(30));
        assert_eq!(summary.average_order_value, Decimal::from(15));
    }

    #[test]
    fn test_sales_date_window() {
        let p = Uuid::new_v4();
        let orders = vec![
            order(OrderStatus::Pending, vec![item(p, "Mug", 10, 1)], 40),
            order(OrderStatus::Pending, vec![item(p, "Mug", 10, 1)], 2),
        ];
        let filter = SalesFilter {
            start_date: Some(Utc::now() - Duration::days(7)),
            end_date: None,
        };

        assert_eq!(summarize_sales(&orders, filter).order_count, 1);
    }

    #[test]
    fn test_top_products_ranked_by_revenue() {
        let (mug, lamp) = (Uuid::new_v4(), Uuid::new_v4());
        let orders = vec![
            order(
                OrderStatus::Pending,
                vec![item(mug, "Mug", 5, 10), item(lamp, "Lamp", 80, 1)],
                1,
            ),
            order(OrderStatus::Shipped, vec![item(mug, "Mug", 5, 4)], 1),
            order(OrderStatus::Cancelled, vec![item(mug, "Mug", 5, 100)], 1),
        ];

        let ranked = rank_products(&orders, 10);

        assert_eq!(ranked[0].product_name, "Lamp");
        assert_eq!(ranked[1].quantity_sold, 14);
        assert_eq!(ranked[1].revenue, Decimal::from(70));
        assert_eq!(rank_products(&orders, 1).len(), 1);
    }
}
