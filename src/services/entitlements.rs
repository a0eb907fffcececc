//! Plan limit enforcement shared by the resource services.
//!
//! Creation paths run inside a transaction: lock the tenant row, count, then
//! check. Concurrent creators for the same tenant serialize on the lock, so
//! the count they see already includes each other's rows.

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::{Plan, Tenant, TenantUsage};
use crate::errors::{AppResult, OptionExt};
use crate::infra::Repos;
use policy::{check_capacity, LimitKey};

/// Lock `tenant_id` for the rest of the transaction and load its plan.
pub(crate) async fn lock_tenant<C: ConnectionTrait>(
    repos: Repos<'_, C>,
    tenant_id: Uuid,
) -> AppResult<(Tenant, Plan)> {
    let tenant = repos.tenants().lock(tenant_id).await?;
    let plan = repos
        .plans()
        .find_by_id(tenant.plan_id)
        .await?
        .ok_or_not_found("Plan")?;
    Ok((tenant, plan))
}

/// Fail with a capacity error unless one more `key` resource fits.
pub(crate) fn ensure_capacity(tenant: &Tenant, plan: &Plan, key: LimitKey, current: u64) -> AppResult<()> {
    let limits = tenant.effective_limits(plan);
    check_capacity(&limits, key, current, &plan.display_name).map_err(|e| {
        tracing::info!(tenant_id = %tenant.id, limit = %key, current, "Plan limit reached");
        e.into()
    })
}

/// Products count against one quota across the inventory and the store.
pub(crate) async fn product_count<C: ConnectionTrait>(repos: Repos<'_, C>, tenant_id: Uuid) -> AppResult<u64> {
    let inventory = repos.inventory().count(tenant_id).await?;
    let shop = repos.shop_products().count(tenant_id).await?;
    Ok(inventory + shop)
}

pub(crate) async fn usage<C: ConnectionTrait>(repos: Repos<'_, C>, tenant_id: Uuid) -> AppResult<TenantUsage> {
    Ok(TenantUsage {
        users: repos.users().count(tenant_id).await?,
        products: product_count(repos, tenant_id).await?,
        tables: repos.tables().count(tenant_id).await?,
    })
}
