//! Policy layer - Tenant entitlement and access rules.
//!
//! This crate contains pure business rules with no infrastructure dependencies:
//! plan limit resolution, capacity decisions, roles, the tenant status machine,
//! coupon evaluation and password hashing. Everything here is synchronous and
//! testable without a database.

pub mod constants;
pub mod coupon;
pub mod error;
pub mod limits;
pub mod password;
pub mod role;
pub mod tenant;

pub use constants::*;
pub use coupon::{evaluate_coupon, CouponRejection, CouponTerms, DiscountType};
pub use error::{DomainError, DomainResult};
pub use limits::{
    check_capacity, resolve_limits, EffectiveLimits, Limit, LimitKey, LimitSet, PlanFeatures,
};
pub use password::Password;
pub use role::{authorize, Role, MANAGERS};
pub use tenant::{
    days_remaining, login_gate, trial_end, BillingCycle, BusinessType, LoginDecision, TenantStatus,
};
