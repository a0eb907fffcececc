//! Platform admin identity and audit trail types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use rust_decimal::Decimal;

use super::tenant::{Plan, Tenant, TenantUsage};
use super::user::User;
use policy::{EffectiveLimits, TenantStatus};

/// Platform operator
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAdmin {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One audit log row
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// An audit entry about to be written
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub admin_id: Uuid,
    pub action: &'static str,
    pub target_type: &'static str,
    pub target_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminLogin {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SuspendTenant {
    #[validate(length(min = 1, max = 500, message = "A reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TenantFilter {
    pub status: Option<TenantStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    pub target_type: Option<String>,
    pub action: Option<String>,
}

/// Row of the admin tenant listing
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantListItem {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub plan_name: String,
    pub user_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantDetail {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub plan: Plan,
    #[schema(value_type = Object)]
    pub limits: EffectiveLimits,
    pub usage: TenantUsage,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOverview {
    pub total_tenants: u64,
    pub active_tenants: u64,
    pub trial_tenants: u64,
    pub suspended_tenants: u64,
    pub new_tenants_this_month: u64,
    pub total_users: u64,
    /// Sum of plan prices over active tenants
    pub mrr: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GrowthPoint {
    /// `YYYY-MM`
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanShare {
    pub plan: String,
    pub count: u64,
}
