//! Coupon service - Discount codes and their side-effect free validation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Coupon, CouponValidation, CreateCoupon, TenantContext, UpdateCoupon, ValidateCoupon,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::Paginated;
use policy::{evaluate_coupon, CouponRejection, DiscountType};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// What happened to a coupon on delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRemoval {
    Deleted,
    /// Kept for the orders that reference it, but no longer redeemable
    Deactivated,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CouponService: Send + Sync {
    async fn create_coupon(&self, ctx: &TenantContext, input: CreateCoupon) -> AppResult<Coupon>;

    async fn list_coupons(&self, ctx: &TenantContext, page: u64, limit: u64) -> AppResult<Paginated<Coupon>>;

    async fn get_coupon(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Coupon>;

    async fn update_coupon(&self, ctx: &TenantContext, id: Uuid, input: UpdateCoupon) -> AppResult<Coupon>;

    async fn delete_coupon(&self, ctx: &TenantContext, id: Uuid) -> AppResult<CouponRemoval>;

    /// Check a code against an order total. Never changes the usage count.
    async fn validate_coupon(&self, ctx: &TenantContext, input: ValidateCoupon) -> AppResult<CouponValidation>;
}

pub struct CouponManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CouponManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

/// Discount a coupon (or its absence) grants on `subtotal` at `now`.
pub(crate) fn price_coupon(
    coupon: Option<&Coupon>,
    subtotal: Decimal,
    now: DateTime<Utc>,
) -> Result<Decimal, CouponRejection> {
    let coupon = coupon.ok_or(CouponRejection::NotFound)?;
    evaluate_coupon(&coupon.terms(), subtotal, now)
}

fn check_terms(
    discount_type: DiscountType,
    value: Decimal,
    starts_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation("Discount value must be greater than zero"));
    }
    if discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(AppError::validation("Percentage discount cannot exceed 100"));
    }
    if let (Some(start), Some(end)) = (starts_at, expires_at) {
        if end <= start {
            return Err(AppError::validation("Expiry must be after the start date"));
        }
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> CouponService for CouponManager<U> {
    async fn create_coupon(&self, ctx: &TenantContext, input: CreateCoupon) -> AppResult<Coupon> {
        check_terms(input.discount_type, input.discount_value, input.starts_at, input.expires_at)?;
        let repos = self.uow.repos();

        if repos.coupons().code_taken(ctx.tenant_id, &input.code, None).await? {
            return Err(AppError::conflict("Coupon code already exists"));
        }
        repos.coupons().create(ctx.tenant_id, input).await
    }

    async fn list_coupons(&self, ctx: &TenantContext, page: u64, limit: u64) -> AppResult<Paginated<Coupon>> {
        self.uow.repos().coupons().list(ctx.tenant_id, page, limit).await
    }

    async fn get_coupon(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Coupon> {
        self.uow
            .repos()
            .coupons()
            .find(ctx.tenant_id, id)
            .await?
            .ok_or_not_found("Coupon")
    }

    async fn update_coupon(&self, ctx: &TenantContext, id: Uuid, input: UpdateCoupon) -> AppResult<Coupon> {
        let current = self.get_coupon(ctx, id).await?;
        check_terms(
            input.discount_type.unwrap_or(current.discount_type),
            input.discount_value.unwrap_or(current.discount_value),
            input.starts_at.or(current.starts_at),
            input.expires_at.or(current.expires_at),
        )?;

        let repos = self.uow.repos();
        if let Some(code) = input.code.as_deref() {
            if repos.coupons().code_taken(ctx.tenant_id, code, Some(id)).await? {
                return Err(AppError::conflict("Coupon code already exists"));
            }
        }
        repos.coupons().update(ctx.tenant_id, id, input).await
    }

    async fn delete_coupon(&self, ctx: &TenantContext, id: Uuid) -> AppResult<CouponRemoval> {
        let repos = self.uow.repos();
        self.get_coupon(ctx, id).await?;

        if repos.orders().count_with_coupon(ctx.tenant_id, id).await? > 0 {
            repos.coupons().deactivate(ctx.tenant_id, id).await?;
            return Ok(CouponRemoval::Deactivated);
        }
        repos.coupons().delete(ctx.tenant_id, id).await?;
        Ok(CouponRemoval::Deleted)
    }

    async fn validate_coupon(&self, ctx: &TenantContext, input: ValidateCoupon) -> AppResult<CouponValidation> {
        let coupon = self
            .uow
            .repos()
            .coupons()
            .find_by_code(ctx.tenant_id, &input.code)
            .await?;

        Ok(match price_coupon(coupon.as_ref(), input.order_total, Utc::now()) {
            Ok(discount) => CouponValidation {
                valid: true,
                discount_amount: Some(discount),
                code: coupon.map(|c| c.code),
                error: None,
            },
            Err(rejection) => CouponValidation {
                valid: false,
                discount_amount: None,
                code: None,
                error: Some(rejection.to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_coupon_is_not_found() {
        assert_eq!(
            price_coupon(None, Decimal::from(10), Utc::now()),
            Err(CouponRejection::NotFound)
        );
    }

    #[test]
    fn test_percentage_over_hundred_rejected() {
        assert!(check_terms(DiscountType::Percentage, Decimal::from(150), None, None).is_err());
        assert!(check_terms(DiscountType::FixedAmount, Decimal::from(150), None, None).is_ok());
    }
}
