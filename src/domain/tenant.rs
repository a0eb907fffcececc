//! Tenant, plan and module domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use policy::{
    resolve_limits, BillingCycle, BusinessType, EffectiveLimits, LimitSet, PlanFeatures,
    TenantStatus,
};

/// Tenant domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub business_type: BusinessType,
    pub status: TenantStatus,
    pub plan_id: Uuid,
    #[schema(value_type = Option<Object>)]
    pub custom_limits: Option<LimitSet>,
    pub trial_start_date: Option<DateTime<Utc>>,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub trial_converted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Limits in force for this tenant on `plan`
    pub fn effective_limits(&self, plan: &Plan) -> EffectiveLimits {
        resolve_limits(&plan.features.limits(), self.custom_limits.as_ref())
    }

    /// Whole days left in the trial, if the tenant is on one
    pub fn trial_days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        match (self.status, self.trial_end_date) {
            (TenantStatus::Trial, Some(end)) => Some(policy::days_remaining(end, now)),
            _ => None,
        }
    }
}

/// Subscription plan
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub billing_cycle: BillingCycle,
    #[schema(value_type = Object)]
    pub features: PlanFeatures,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Module enabled for a tenant
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnabledModule {
    pub name: String,
    pub display_name: String,
}

/// Resource usage counted against plan limits
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantUsage {
    pub users: u64,
    pub products: u64,
    pub tables: u64,
}

/// Self-service signup: a new tenant plus its owner account
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenant {
    #[validate(length(min = 2, max = 100, message = "Business name must be at least 2 characters"))]
    #[schema(example = "Acme Supplies")]
    pub tenant_name: String,
    #[schema(example = "acme")]
    pub slug: String,
    pub business_type: BusinessType,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "owner@acme.test")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenant {
    #[validate(length(min = 2, max = 100, message = "Business name must be at least 2 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpgradePlan {
    pub plan_id: Uuid,
}

/// Tenant as seen by its own users
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantOverview {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub plan: Plan,
    #[schema(value_type = Object)]
    pub limits: EffectiveLimits,
    pub usage: TenantUsage,
    pub days_remaining: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlan {
    #[validate(length(min = 2, max = 50, message = "Plan name must be 2-50 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub billing_cycle: BillingCycle,
    pub features: PlanFeatures,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlan {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub billing_cycle: Option<BillingCycle>,
    pub features: Option<PlanFeatures>,
    pub is_active: Option<bool>,
}

/// Plan with the number of tenants subscribed to it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    #[serde(flatten)]
    pub plan: Plan,
    pub tenant_count: u64,
}

/// Compact tenant view returned with the signed-in user
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: TenantStatus,
    pub plan: String,
    pub days_remaining: Option<i64>,
}

impl TenantSummary {
    pub fn new(tenant: &Tenant, plan: &Plan, now: DateTime<Utc>) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name.clone(),
            slug: tenant.slug.clone(),
            status: tenant.status,
            plan: plan.display_name.clone(),
            days_remaining: tenant.trial_days_remaining(now),
        }
    }
}
