//! Coupon eligibility and discount arithmetic.
//!
//! Evaluation never mutates anything: the usage counter is only bumped by
//! checkout, so validating a code any number of times has no effect.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::FixedAmount => "fixed_amount",
        }
    }

    /// Discount for `subtotal`. Percentage is exact; fixed amounts are capped
    /// at the subtotal.
    pub fn discount(&self, value: Decimal, subtotal: Decimal) -> Decimal {
        let amount = match self {
            DiscountType::Percentage => subtotal * value / Decimal::ONE_HUNDRED,
            DiscountType::FixedAmount => value.min(subtotal),
        };
        amount.max(Decimal::ZERO)
    }
}

impl FromStr for DiscountType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed_amount" => Ok(DiscountType::FixedAmount),
            other => Err(DomainError::validation(format!("Unknown discount type '{}'", other))),
        }
    }
}

/// The parts of a stored coupon that decide whether it applies.
#[derive(Debug, Clone)]
pub struct CouponTerms {
    pub is_active: bool,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Why a coupon cannot be applied. These are answers, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    NotFound,
    Inactive,
    NotYetActive,
    Expired,
    UsageLimitReached,
    MinimumNotMet(Decimal),
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponRejection::NotFound => write!(f, "Coupon not found"),
            CouponRejection::Inactive => write!(f, "Coupon is not active"),
            CouponRejection::NotYetActive => write!(f, "Coupon not yet active"),
            CouponRejection::Expired => write!(f, "Coupon has expired"),
            CouponRejection::UsageLimitReached => write!(f, "Coupon usage limit reached"),
            CouponRejection::MinimumNotMet(min) => {
                write!(f, "Minimum order amount of ${} required", min.normalize())
            }
        }
    }
}

/// Check `terms` against an order subtotal at `now` and return the discount.
pub fn evaluate_coupon(
    terms: &CouponTerms,
    subtotal: Decimal,
    now: DateTime<Utc>,
) -> Result<Decimal, CouponRejection> {
    if !terms.is_active {
        return Err(CouponRejection::Inactive);
    }
    if matches!(terms.starts_at, Some(start) if now < start) {
        return Err(CouponRejection::NotYetActive);
    }
    if matches!(terms.expires_at, Some(end) if now > end) {
        return Err(CouponRejection::Expired);
    }
    if matches!(terms.max_uses, Some(max) if terms.used_count >= max) {
        return Err(CouponRejection::UsageLimitReached);
    }
    if let Some(min) = terms.min_order_amount {
        if subtotal < min {
            return Err(CouponRejection::MinimumNotMet(min));
        }
    }

    Ok(terms.discount_type.discount(terms.discount_value, subtotal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn save10() -> CouponTerms {
        CouponTerms {
            is_active: true,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(10),
            min_order_amount: Some(Decimal::from(50)),
            max_uses: None,
            used_count: 0,
            starts_at: None,
            expires_at: None,
        }
    }

    #[test]
    fn test_percentage_discount_is_exact() {
        let subtotal = Decimal::new(12345, 2);
        let discount = DiscountType::Percentage.discount(Decimal::from(10), subtotal);
        assert_eq!(discount, Decimal::new(12345, 3));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let discount = DiscountType::FixedAmount.discount(Decimal::from(25), Decimal::from(20));
        assert_eq!(discount, Decimal::from(20));

        let discount = DiscountType::FixedAmount.discount(Decimal::from(5), Decimal::from(20));
        assert_eq!(discount, Decimal::from(5));
    }

    #[test]
    fn test_minimum_order_amount() {
        let now = Utc::now();
        let err = evaluate_coupon(&save10(), Decimal::from(40), now).unwrap_err();
        assert_eq!(err, CouponRejection::MinimumNotMet(Decimal::from(50)));
        assert!(err.to_string().starts_with("Minimum order amount"));

        let discount = evaluate_coupon(&save10(), Decimal::from(100), now).unwrap();
        assert_eq!(discount, Decimal::from(10));
    }

    #[test]
    fn test_window_bounds() {
        let now = Utc::now();
        let mut terms = save10();
        terms.starts_at = Some(now + Duration::hours(1));
        assert_eq!(
            evaluate_coupon(&terms, Decimal::from(100), now),
            Err(CouponRejection::NotYetActive)
        );

        terms.starts_at = None;
        terms.expires_at = Some(now - Duration::hours(1));
        assert_eq!(
            evaluate_coupon(&terms, Decimal::from(100), now),
            Err(CouponRejection::Expired)
        );
    }

    #[test]
    fn test_usage_limit() {
        let mut terms = save10();
        terms.max_uses = Some(3);
        terms.used_count = 3;
        assert_eq!(
            evaluate_coupon(&terms, Decimal::from(100), Utc::now()),
            Err(CouponRejection::UsageLimitReached)
        );
    }

    #[test]
    fn test_inactive_coupon() {
        let mut terms = save10();
        terms.is_active = false;
        assert_eq!(
            evaluate_coupon(&terms, Decimal::from(100), Utc::now()),
            Err(CouponRejection::Inactive)
        );
    }
}
