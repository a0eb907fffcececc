//! Tenant service - The signed-in tenant's own account and subscription.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::entitlements;
use crate::domain::{EnabledModule, Plan, Tenant, TenantContext, TenantOverview, UpdateTenant};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;
use policy::{Role, MANAGERS, TRIAL_PLAN_NAME};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TenantService: Send + Sync {
    /// Tenant with its plan, effective limits and current usage
    async fn overview(&self, ctx: &TenantContext) -> AppResult<TenantOverview>;

    async fn rename(&self, ctx: &TenantContext, input: UpdateTenant) -> AppResult<Tenant>;

    /// Owner-only switch to a paid plan. Ends a trial and is the way back
    /// from `expired`.
    async fn upgrade(&self, ctx: &TenantContext, plan_id: Uuid) -> AppResult<TenantOverview>;

    async fn modules(&self, ctx: &TenantContext) -> AppResult<Vec<EnabledModule>>;

    /// Plans a tenant can subscribe to
    async fn available_plans(&self) -> AppResult<Vec<Plan>>;
}

pub struct TenantManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> TenantManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> TenantService for TenantManager<U> {
    async fn overview(&self, ctx: &TenantContext) -> AppResult<TenantOverview> {
        let repos = self.uow.repos();
        let tenant = repos
            .tenants()
            .find_by_id(ctx.tenant_id)
            .await?
            .ok_or_not_found("Tenant")?;
        let plan = repos
            .plans()
            .find_by_id(tenant.plan_id)
            .await?
            .ok_or_not_found("Plan")?;
        let usage = entitlements::usage(repos, tenant.id).await?;

        Ok(TenantOverview {
            limits: tenant.effective_limits(&plan),
            days_remaining: tenant.trial_days_remaining(Utc::now()),
            tenant,
            plan,
            usage,
        })
    }

    async fn rename(&self, ctx: &TenantContext, input: UpdateTenant) -> AppResult<Tenant> {
        ctx.require(MANAGERS)?;
        self.uow
            .repos()
            .tenants()
            .rename(ctx.tenant_id, input.name.trim().to_string())
            .await
    }

    async fn upgrade(&self, ctx: &TenantContext, plan_id: Uuid) -> AppResult<TenantOverview> {
        ctx.require(&[Role::Owner])?;
        let tenant_id = ctx.tenant_id;

        let tenant = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let tenant = repos.tenants().lock(tenant_id).await?;
            let plan = repos
                .plans()
                .find_by_id(plan_id)
                .await?
                .ok_or_not_found("Plan")?;

            if plan.name == TRIAL_PLAN_NAME || !plan.is_active {
                return Err(AppError::validation("This plan is not available for upgrade"));
            }

            let status = tenant.status.upgrade()?;
            repos.tenants().change_plan(tenant_id, plan.id, status).await
        })?;

        tracing::info!(tenant_id = %tenant.id, plan_id = %plan_id, "Tenant upgraded plan");
        self.overview(ctx).await
    }

    async fn modules(&self, ctx: &TenantContext) -> AppResult<Vec<EnabledModule>> {
        self.uow.repos().modules().enabled_for(ctx.tenant_id).await
    }

    async fn available_plans(&self) -> AppResult<Vec<Plan>> {
        let plans = self.uow.repos().plans().list().await?;
        Ok(plans
            .into_iter()
            .filter(|p| p.is_active && p.name != TRIAL_PLAN_NAME)
            .collect())
    }
}
