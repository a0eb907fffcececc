//! Platform admin service - Cross-tenant operations for platform operators.
//!
//! This is the only service that reads across tenants. Every mutation it
//! makes is written to the audit log in the same transaction as the change.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth_service::dummy_hash;
use super::container::parallel;
use super::entitlements;
use super::tokens::{AdminClaims, TokenIssuer, TokenResponse};
use crate::config::{
    Config, AUDIT_ACTIVATE_TENANT, AUDIT_ADMIN_LOGIN, AUDIT_CREATE_PLAN, AUDIT_DELETE_PLAN,
    AUDIT_SUSPEND_TENANT, AUDIT_TARGET_ADMIN, AUDIT_TARGET_PLAN, AUDIT_TARGET_TENANT,
    AUDIT_UPDATE_PLAN, AUDIT_UPDATE_TENANT_LIMITS, TREND_MONTHS,
};
use crate::domain::{
    AdminContext, AuditEntry, AuditFilter, CreatePlan, GrowthPoint, NewAuditEntry, Plan,
    PlanShare, PlanSummary, PlatformAdmin, PlatformOverview, Tenant, TenantDetail, TenantFilter,
    TenantListItem, UpdatePlan,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::Paginated;
use crate::utils::{month_key, month_start, trailing_months};
use crate::with_transaction;
use policy::{LimitSet, Password, TenantStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Token plus the operator it was issued to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSession {
    #[serde(flatten)]
    pub token: TokenResponse,
    pub admin: PlatformAdmin,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminService: Send + Sync {
    async fn login(&self, email: String, password: String) -> AppResult<AdminSession>;

    fn verify_token(&self, token: &str) -> AppResult<AdminClaims>;

    /// Re-read the admin behind verified claims
    async fn authenticate(&self, claims: &AdminClaims) -> AppResult<AdminContext>;

    async fn me(&self, ctx: &AdminContext) -> AppResult<PlatformAdmin>;

    async fn list_tenants(&self, filter: TenantFilter, page: u64, limit: u64) -> AppResult<Paginated<TenantListItem>>;

    async fn tenant_detail(&self, id: Uuid) -> AppResult<TenantDetail>;

    async fn suspend_tenant(&self, ctx: &AdminContext, id: Uuid, reason: String) -> AppResult<Tenant>;

    /// Reinstate a suspended tenant
    async fn activate_tenant(&self, ctx: &AdminContext, id: Uuid) -> AppResult<Tenant>;

    /// Replace the tenant's limit overrides. An empty set clears them.
    async fn set_tenant_limits(&self, ctx: &AdminContext, id: Uuid, limits: LimitSet) -> AppResult<Tenant>;

    async fn create_plan(&self, ctx: &AdminContext, input: CreatePlan) -> AppResult<Plan>;

    async fn list_plans(&self) -> AppResult<Vec<PlanSummary>>;

    async fn get_plan(&self, id: Uuid) -> AppResult<PlanSummary>;

    async fn update_plan(&self, ctx: &AdminContext, id: Uuid, input: UpdatePlan) -> AppResult<Plan>;

    /// Delete a plan no tenant is on
    async fn delete_plan(&self, ctx: &AdminContext, id: Uuid) -> AppResult<()>;

    async fn audit_logs(&self, filter: AuditFilter, page: u64, limit: u64) -> AppResult<Paginated<AuditEntry>>;

    async fn overview(&self) -> AppResult<PlatformOverview>;

    /// New tenants per month over the trailing window, oldest first
    async fn tenant_growth(&self) -> AppResult<Vec<GrowthPoint>>;

    async fn plan_distribution(&self) -> AppResult<Vec<PlanShare>>;
}

pub struct AdminManager<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: TokenIssuer,
}

impl<U: UnitOfWork> AdminManager<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self {
            uow,
            tokens: TokenIssuer::new(config),
        }
    }

    async fn tenant(&self, id: Uuid) -> AppResult<Tenant> {
        self.uow
            .repos()
            .tenants()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Tenant")
    }
}

fn audit(
    admin_id: Uuid,
    action: &'static str,
    target_type: &'static str,
    target_id: Uuid,
    details: Option<serde_json::Value>,
) -> NewAuditEntry {
    NewAuditEntry {
        admin_id,
        action,
        target_type,
        target_id: Some(target_id),
        details,
    }
}

#[async_trait]
impl<U: UnitOfWork> AdminService for AdminManager<U> {
    async fn login(&self, email: String, password: String) -> AppResult<AdminSession> {
        let email = email.trim().to_lowercase();
        let repos = self.uow.repos();
        let found = repos.admins().find_by_email(&email).await?;

        let hash = match &found {
            Some(admin) => admin.password_hash.clone(),
            None => dummy_hash(),
        };
        let password_valid = Password::from_hash(hash).verify(&password);

        let admin = match found {
            Some(admin) if password_valid => admin,
            _ => return Err(AppError::InvalidCredentials),
        };
        if !admin.is_active {
            return Err(AppError::access_denied("Your admin account has been deactivated"));
        }

        let admin_id = admin.id;
        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            repos.admins().touch_login(admin_id).await?;
            repos
                .audit()
                .append(audit(admin_id, AUDIT_ADMIN_LOGIN, AUDIT_TARGET_ADMIN, admin_id, None))
                .await?;
            Ok(())
        })?;

        tracing::info!(admin_id = %admin.id, "Platform admin signed in");
        let token = self.tokens.issue_admin(admin.id, &admin.email)?;
        Ok(AdminSession { token, admin })
    }

    fn verify_token(&self, token: &str) -> AppResult<AdminClaims> {
        self.tokens.verify_admin(token)
    }

    async fn authenticate(&self, claims: &AdminClaims) -> AppResult<AdminContext> {
        let admin = self
            .uow
            .repos()
            .admins()
            .find_by_id(claims.sub)
            .await?
            .filter(|a| a.is_active)
            .ok_or(AppError::Unauthorized)?;

        Ok(AdminContext {
            admin_id: admin.id,
            email: admin.email,
        })
    }

    async fn me(&self, ctx: &AdminContext) -> AppResult<PlatformAdmin> {
        self.uow
            .repos()
            .admins()
            .find_by_id(ctx.admin_id)
            .await?
            .ok_or_not_found("Admin")
    }

    async fn list_tenants(&self, filter: TenantFilter, page: u64, limit: u64) -> AppResult<Paginated<TenantListItem>> {
        let repos = self.uow.repos();
        let tenants = repos.tenants().list(&filter, page, limit).await?;
        let plan_names: HashMap<Uuid, String> = repos
            .plans()
            .list()
            .await?
            .into_iter()
            .map(|p| (p.id, p.display_name))
            .collect();

        let users = repos.users();
        let counts = parallel::join_all(
            tenants
                .data
                .iter()
                .map(|t| users.count(t.id))
                .collect(),
        )
        .await?;
        let user_counts: HashMap<Uuid, u64> = tenants.data.iter().map(|t| t.id).zip(counts).collect();

        Ok(tenants.map(|tenant| TenantListItem {
            plan_name: plan_names.get(&tenant.plan_id).cloned().unwrap_or_default(),
            user_count: user_counts.get(&tenant.id).copied().unwrap_or(0),
            tenant,
        }))
    }

    async fn tenant_detail(&self, id: Uuid) -> AppResult<TenantDetail> {
        let repos = self.uow.repos();
        let tenant = self.tenant(id).await?;
        let plan = repos
            .plans()
            .find_by_id(tenant.plan_id)
            .await?
            .ok_or_not_found("Plan")?;

        Ok(TenantDetail {
            limits: tenant.effective_limits(&plan),
            usage: entitlements::usage(repos, id).await?,
            users: repos.users().list_all(id).await?,
            tenant,
            plan,
        })
    }

    async fn suspend_tenant(&self, ctx: &AdminContext, id: Uuid, reason: String) -> AppResult<Tenant> {
        let admin_id = ctx.admin_id;

        let tenant = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let tenant = repos.tenants().lock(id).await?;
            let tenant = repos.tenants().set_status(tenant.id, tenant.status.suspend()).await?;
            repos
                .audit()
                .append(audit(
                    admin_id,
                    AUDIT_SUSPEND_TENANT,
                    AUDIT_TARGET_TENANT,
                    id,
                    Some(json!({ "reason": reason })),
                ))
                .await?;
            Ok(tenant)
        })?;

        tracing::warn!(tenant_id = %id, %admin_id, "Tenant suspended");
        Ok(tenant)
    }

    async fn activate_tenant(&self, ctx: &AdminContext, id: Uuid) -> AppResult<Tenant> {
        let admin_id = ctx.admin_id;

        let tenant = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let tenant = repos.tenants().lock(id).await?;
            let status = tenant.status.activate()?;
            let tenant = repos.tenants().set_status(id, status).await?;
            repos
                .audit()
                .append(audit(admin_id, AUDIT_ACTIVATE_TENANT, AUDIT_TARGET_TENANT, id, None))
                .await?;
            Ok(tenant)
        })?;

        tracing::info!(tenant_id = %id, %admin_id, "Tenant activated");
        Ok(tenant)
    }

    async fn set_tenant_limits(&self, ctx: &AdminContext, id: Uuid, limits: LimitSet) -> AppResult<Tenant> {
        let admin_id = ctx.admin_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            repos.tenants().lock(id).await?;
            let tenant = repos.tenants().set_custom_limits(id, Some(&limits)).await?;
            repos
                .audit()
                .append(audit(
                    admin_id,
                    AUDIT_UPDATE_TENANT_LIMITS,
                    AUDIT_TARGET_TENANT,
                    id,
                    Some(json!({ "customLimits": limits.to_json() })),
                ))
                .await?;
            Ok(tenant)
        })
    }

    async fn create_plan(&self, ctx: &AdminContext, input: CreatePlan) -> AppResult<Plan> {
        if input.price < Decimal::ZERO {
            return Err(AppError::validation("Price cannot be negative"));
        }
        let admin_id = ctx.admin_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            if repos.plans().find_by_name(&input.name).await?.is_some() {
                return Err(AppError::conflict("A plan with this name already exists"));
            }
            let plan = repos.plans().create(input).await?;
            repos
                .audit()
                .append(audit(
                    admin_id,
                    AUDIT_CREATE_PLAN,
                    AUDIT_TARGET_PLAN,
                    plan.id,
                    Some(json!({ "name": plan.name })),
                ))
                .await?;
            Ok(plan)
        })
    }

    async fn list_plans(&self) -> AppResult<Vec<PlanSummary>> {
        let repos = self.uow.repos();
        let plans = repos.plans().list().await?;
        let counts = tenants_per_plan(&repos.tenants().all().await?);

        Ok(plans
            .into_iter()
            .map(|plan| PlanSummary {
                tenant_count: counts.get(&plan.id).copied().unwrap_or(0),
                plan,
            })
            .collect())
    }

    async fn get_plan(&self, id: Uuid) -> AppResult<PlanSummary> {
        let repos = self.uow.repos();
        let plan = repos.plans().find_by_id(id).await?.ok_or_not_found("Plan")?;
        Ok(PlanSummary {
            tenant_count: repos.tenants().count_on_plan(id).await?,
            plan,
        })
    }

    async fn update_plan(&self, ctx: &AdminContext, id: Uuid, input: UpdatePlan) -> AppResult<Plan> {
        if input.price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(AppError::validation("Price cannot be negative"));
        }
        let admin_id = ctx.admin_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let plan = repos.plans().update(id, input).await?;
            repos
                .audit()
                .append(audit(admin_id, AUDIT_UPDATE_PLAN, AUDIT_TARGET_PLAN, id, None))
                .await?;
            Ok(plan)
        })
    }

    async fn delete_plan(&self, ctx: &AdminContext, id: Uuid) -> AppResult<()> {
        let admin_id = ctx.admin_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let plan = repos.plans().find_by_id(id).await?.ok_or_not_found("Plan")?;

            if repos.tenants().count_on_plan(id).await? > 0 {
                return Err(AppError::conflict("Cannot delete plan with active tenants"));
            }
            repos.plans().delete(id).await?;
            repos
                .audit()
                .append(audit(
                    admin_id,
                    AUDIT_DELETE_PLAN,
                    AUDIT_TARGET_PLAN,
                    id,
                    Some(json!({ "name": plan.name })),
                ))
                .await?;
            Ok(())
        })
    }

    async fn audit_logs(&self, filter: AuditFilter, page: u64, limit: u64) -> AppResult<Paginated<AuditEntry>> {
        self.uow.repos().audit().list(&filter, page, limit).await
    }

    async fn overview(&self) -> AppResult<PlatformOverview> {
        let repos = self.uow.repos();
        let (tenants, plans, total_users) = parallel::join3(
            repos.tenants().all(),
            repos.plans().list(),
            repos.users().count_all(),
        )
        .await?;

        Ok(platform_overview(&tenants, &plans, total_users, Utc::now()))
    }

    async fn tenant_growth(&self) -> AppResult<Vec<GrowthPoint>> {
        let tenants = self.uow.repos().tenants().all().await?;
        let months = trailing_months(Utc::now().date_naive(), TREND_MONTHS);
        Ok(growth(&tenants, &months))
    }

    async fn plan_distribution(&self) -> AppResult<Vec<PlanShare>> {
        let repos = self.uow.repos();
        let counts = tenants_per_plan(&repos.tenants().all().await?);

        Ok(repos
            .plans()
            .list()
            .await?
            .into_iter()
            .map(|plan| PlanShare {
                count: counts.get(&plan.id).copied().unwrap_or(0),
                plan: plan.display_name,
            })
            .collect())
    }
}

fn tenants_per_plan(tenants: &[Tenant]) -> HashMap<Uuid, u64> {
    let mut counts = HashMap::new();
    for tenant in tenants {
        *counts.entry(tenant.plan_id).or_insert(0) += 1;
    }
    counts
}

fn platform_overview(tenants: &[Tenant], plans: &[Plan], total_users: u64, now: DateTime<Utc>) -> PlatformOverview {
    let count = |status: TenantStatus| tenants.iter().filter(|t| t.status == status).count() as u64;
    let prices: HashMap<Uuid, Decimal> = plans.iter().map(|p| (p.id, p.price)).collect();
    let month_began = month_start(now.date_naive());

    PlatformOverview {
        total_tenants: tenants.len() as u64,
        active_tenants: count(TenantStatus::Active),
        trial_tenants: count(TenantStatus::Trial),
        suspended_tenants: count(TenantStatus::Suspended),
        new_tenants_this_month: tenants
            .iter()
            .filter(|t| t.created_at.date_naive() >= month_began)
            .count() as u64,
        total_users,
        mrr: tenants
            .iter()
            .filter(|t| t.status == TenantStatus::Active)
            .filter_map(|t| prices.get(&t.plan_id))
            .copied()
            .sum(),
    }
}

fn growth(tenants: &[Tenant], months: &[NaiveDate]) -> Vec<GrowthPoint> {
    months
        .iter()
        .map(|month| {
            let key = month_key(*month);
            GrowthPoint {
                count: tenants
                    .iter()
                    .filter(|t| month_key(t.created_at.date_naive()) == key)
                    .count() as u64,
                month: key,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use policy::{BillingCycle, BusinessType, PlanFeatures};

    fn plan(price: i64) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            name: format!("plan-{}", price),
            display_name: format!("Plan {}", price),
            description: None,
            price: Decimal::from(price),
            billing_cycle: BillingCycle::Monthly,
            features: PlanFeatures::default(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn tenant(plan: &Plan, status: TenantStatus, created_at: DateTime<Utc>) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            slug: "acme".into(),
            business_type: BusinessType::Inventory,
            status,
            plan_id: plan.id,
            custom_limits: None,
            trial_start_date: None,
            trial_end_date: None,
            trial_converted: false,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_mrr_counts_only_active_tenants() {
        let (basic, pro) = (plan(10), plan(30));
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let tenants = vec![
            tenant(&basic, TenantStatus::Active, earlier),
            tenant(&pro, TenantStatus::Active, now),
            tenant(&pro, TenantStatus::Suspended, earlier),
            tenant(&basic, TenantStatus::Trial, now),
        ];

        let overview = platform_overview(&tenants, &[basic, pro], 9, now);

        assert_eq!(overview.total_tenants, 4);
        assert_eq!(overview.active_tenants, 2);
        assert_eq!(overview.suspended_tenants, 1);
        assert_eq!(overview.trial_tenants, 1);
        assert_eq!(overview.new_tenants_this_month, 2);
        assert_eq!(overview.mrr, Decimal::from(40));
    }

    #[test]
    fn test_growth_fills_empty_months() {
        let basic = plan(10);
        let at = |m| Utc.with_ymd_and_hms(2024, m, 3, 0, 0, 0).unwrap();
        let tenants = vec![
            tenant(&basic, TenantStatus::Trial, at(1)),
            tenant(&basic, TenantStatus::Trial, at(3)),
            tenant(&basic, TenantStatus::Trial, at(3)),
        ];
        let months = trailing_months(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), 3);

        let points = growth(&tenants, &months);

        assert_eq!(
            points,
            vec![
                GrowthPoint { month: "2024-01".into(), count: 1 },
                GrowthPoint { month: "2024-02".into(), count: 0 },
                GrowthPoint { month: "2024-03".into(), count: 2 },
            ]
        );
    }
}
