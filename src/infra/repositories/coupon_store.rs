//! Discount coupons. Codes are stored and matched uppercase.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::coupon;
use super::fetch_page;
use crate::domain::{Coupon, CreateCoupon, UpdateCoupon};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::Paginated;
use policy::normalize_coupon_code as normalize_code;

pub struct CouponStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> CouponStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Coupon>> {
        let model = coupon::Entity::find_by_id(id)
            .filter(coupon::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;
        Ok(model.map(Coupon::from))
    }

    pub async fn find_by_code(&self, tenant_id: Uuid, code: &str) -> AppResult<Option<Coupon>> {
        let model = coupon::Entity::find()
            .filter(coupon::Column::TenantId.eq(tenant_id))
            .filter(coupon::Column::Code.eq(normalize_code(code)))
            .one(self.db)
            .await?;
        Ok(model.map(Coupon::from))
    }

    pub async fn code_taken(&self, tenant_id: Uuid, code: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = coupon::Entity::find()
            .filter(coupon::Column::TenantId.eq(tenant_id))
            .filter(coupon::Column::Code.eq(normalize_code(code)));
        if let Some(id) = except {
            query = query.filter(coupon::Column::Id.ne(id));
        }
        Ok(query.count(self.db).await? > 0)
    }

    pub async fn create(&self, tenant_id: Uuid, input: CreateCoupon) -> AppResult<Coupon> {
        let now = Utc::now();
        let model = coupon::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            code: Set(normalize_code(&input.code)),
            description: Set(input.description),
            discount_type: Set(input.discount_type.as_str().to_string()),
            discount_value: Set(input.discount_value),
            min_order_amount: Set(input.min_order_amount),
            max_uses: Set(input.max_uses),
            used_count: Set(0),
            starts_at: Set(input.starts_at),
            expires_at: Set(input.expires_at),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(Coupon::from(model))
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateCoupon) -> AppResult<Coupon> {
        let model = coupon::Entity::find_by_id(id)
            .filter(coupon::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .ok_or_not_found("Coupon")?;

        let mut active: coupon::ActiveModel = model.into();
        if let Some(code) = input.code {
            active.code = Set(normalize_code(&code));
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(discount_type) = input.discount_type {
            active.discount_type = Set(discount_type.as_str().to_string());
        }
        if let Some(value) = input.discount_value {
            active.discount_value = Set(value);
        }
        if let Some(min) = input.min_order_amount {
            active.min_order_amount = Set(Some(min));
        }
        if let Some(max_uses) = input.max_uses {
            active.max_uses = Set(Some(max_uses));
        }
        if let Some(starts_at) = input.starts_at {
            active.starts_at = Set(Some(starts_at));
        }
        if let Some(expires_at) = input.expires_at {
            active.expires_at = Set(Some(expires_at));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(Coupon::from(active.update(self.db).await?))
    }

    pub async fn deactivate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = coupon::Entity::update_many()
            .col_expr(coupon::Column::IsActive, Expr::value(false))
            .col_expr(coupon::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coupon::Column::Id.eq(id))
            .filter(coupon::Column::TenantId.eq(tenant_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Coupon"));
        }
        Ok(())
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = coupon::Entity::delete_many()
            .filter(coupon::Column::Id.eq(id))
            .filter(coupon::Column::TenantId.eq(tenant_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Coupon"));
        }
        Ok(())
    }

    pub async fn list(&self, tenant_id: Uuid, page: u64, limit: u64) -> AppResult<Paginated<Coupon>> {
        let query = coupon::Entity::find()
            .filter(coupon::Column::TenantId.eq(tenant_id))
            .order_by_desc(coupon::Column::CreatedAt);

        fetch_page(self.db, query, page, limit).await
    }

    /// Count one use, unless the coupon is already at `max_uses`.
    pub async fn redeem(&self, tenant_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = coupon::Entity::update_many()
            .col_expr(coupon::Column::UsedCount, Expr::col(coupon::Column::UsedCount).add(1))
            .col_expr(coupon::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coupon::Column::Id.eq(id))
            .filter(coupon::Column::TenantId.eq(tenant_id))
            .filter(
                Condition::any()
                    .add(coupon::Column::MaxUses.is_null())
                    .add(Expr::col(coupon::Column::UsedCount).lt(Expr::col(coupon::Column::MaxUses))),
            )
            .exec(self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
