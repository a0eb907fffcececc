//! Carts and their lines.
//!
//! Cart items carry no tenant column. Item operations take a [`CartHandle`],
//! which can only be obtained by looking a cart up through its tenant and user.

use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{cart, cart_item};
use crate::config::CART_EXPIRY_DAYS;
use crate::errors::AppResult;

const STATUS_ACTIVE: &str = "active";
const STATUS_CONVERTED: &str = "converted";
const STATUS_EXPIRED: &str = "expired";

/// An active cart owned by a known tenant and user
#[derive(Debug, Clone, Copy)]
pub struct CartHandle {
    pub id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A stored cart line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLineRow {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub struct CartStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> CartStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// The user's active cart, if one exists and has not expired. An expired
    /// cart found here is retired.
    pub async fn find_active(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<Option<CartHandle>> {
        let model = cart::Entity::find()
            .filter(cart::Column::TenantId.eq(tenant_id))
            .filter(cart::Column::UserId.eq(user_id))
            .filter(cart::Column::Status.eq(STATUS_ACTIVE))
            .order_by_desc(cart::Column::CreatedAt)
            .one(self.db)
            .await?;

        let Some(model) = model else {
            return Ok(None);
        };
        if model.expires_at <= Utc::now() {
            self.retire(model.id, STATUS_EXPIRED).await?;
            return Ok(None);
        }

        Ok(Some(CartHandle {
            id: model.id,
            expires_at: model.expires_at,
        }))
    }

    /// The user's active cart, created on first use. Every call pushes the
    /// expiry out.
    pub async fn open(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<CartHandle> {
        let now = Utc::now();
        let expires_at = now + Duration::days(CART_EXPIRY_DAYS);

        if let Some(handle) = self.find_active(tenant_id, user_id).await? {
            cart::Entity::update_many()
                .col_expr(cart::Column::ExpiresAt, Expr::value(expires_at))
                .col_expr(cart::Column::UpdatedAt, Expr::value(now))
                .filter(cart::Column::Id.eq(handle.id))
                .exec(self.db)
                .await?;
            return Ok(CartHandle {
                id: handle.id,
                expires_at,
            });
        }

        let model = cart::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            user_id: Set(user_id),
            status: Set(STATUS_ACTIVE.to_string()),
            expires_at: Set(expires_at),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        tracing::debug!(cart_id = %model.id, %user_id, "Cart opened");
        Ok(CartHandle {
            id: model.id,
            expires_at: model.expires_at,
        })
    }

    pub async fn lines(&self, cart: &CartHandle) -> AppResult<Vec<CartLineRow>> {
        let items = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(self.db)
            .await?;
        Ok(items
            .into_iter()
            .map(|item| CartLineRow {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect())
    }

    pub async fn quantity_of(&self, cart: &CartHandle, product_id: Uuid) -> AppResult<Option<i32>> {
        let item = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(self.db)
            .await?;
        Ok(item.map(|i| i.quantity))
    }

    /// Insert or overwrite the line for `product_id`
    pub async fn set_quantity(&self, cart: &CartHandle, product_id: Uuid, quantity: i32) -> AppResult<()> {
        let now = Utc::now();
        let existing = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(self.db)
            .await?;

        match existing {
            Some(item) => {
                let mut active: cart_item::ActiveModel = item.into();
                active.quantity = Set(quantity);
                active.updated_at = Set(now);
                active.update(self.db).await?;
            }
            None => {
                cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart.id),
                    product_id: Set(product_id),
                    quantity: Set(quantity),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(self.db)
                .await?;
            }
        }
        Ok(())
    }

    /// Returns false when the product was not in the cart
    pub async fn remove(&self, cart: &CartHandle, product_id: Uuid) -> AppResult<bool> {
        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn clear(&self, cart: &CartHandle) -> AppResult<()> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Claim the cart for an order. False when it stopped being active,
    /// e.g. another checkout converted it first.
    pub async fn mark_converted(&self, cart: &CartHandle) -> AppResult<bool> {
        self.retire(cart.id, STATUS_CONVERTED).await
    }

    async fn retire(&self, id: Uuid, status: &str) -> AppResult<bool> {
        let result = cart::Entity::update_many()
            .col_expr(cart::Column::Status, Expr::value(status))
            .col_expr(cart::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(cart::Column::Id.eq(id))
            .filter(cart::Column::Status.eq(STATUS_ACTIVE))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
