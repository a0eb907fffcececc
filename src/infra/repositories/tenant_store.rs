//! Tenants, plans and feature modules.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::{module, plan, tenant, tenant_module};
use super::{contains_ci, fetch_page};
use crate::domain::{CreatePlan, EnabledModule, Plan, Tenant, TenantFilter, UpdatePlan};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::Paginated;
use policy::{BusinessType, LimitSet, TenantStatus};

/// Row data for a freshly registered tenant
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub slug: String,
    pub business_type: BusinessType,
    pub plan_id: Uuid,
    pub trial_start_date: DateTime<Utc>,
    pub trial_end_date: DateTime<Utc>,
}

pub struct TenantStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> TenantStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        let model = tenant::Entity::find_by_id(id).one(self.db).await?;
        Ok(model.map(Tenant::from))
    }

    /// Load and lock the tenant row for the rest of the transaction.
    /// Serializes capacity checks for the same tenant.
    pub async fn lock(&self, id: Uuid) -> AppResult<Tenant> {
        tenant::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.db)
            .await?
            .map(Tenant::from)
            .ok_or_not_found("Tenant")
    }

    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        let count = tenant::Entity::find()
            .filter(tenant::Column::Slug.eq(slug))
            .count(self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn create(&self, new: NewTenant) -> AppResult<Tenant> {
        let now = Utc::now();
        let model = tenant::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            slug: Set(new.slug),
            business_type: Set(new.business_type.as_str().to_string()),
            status: Set(TenantStatus::Trial.as_str().to_string()),
            plan_id: Set(new.plan_id),
            custom_limits: Set(None),
            trial_start_date: Set(Some(new.trial_start_date)),
            trial_end_date: Set(Some(new.trial_end_date)),
            trial_converted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(Tenant::from(model))
    }

    async fn find_model(&self, id: Uuid) -> AppResult<tenant::Model> {
        tenant::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_not_found("Tenant")
    }

    pub async fn rename(&self, id: Uuid, name: String) -> AppResult<Tenant> {
        let mut active: tenant::ActiveModel = self.find_model(id).await?.into();
        active.name = Set(name);
        active.updated_at = Set(Utc::now());
        Ok(Tenant::from(active.update(self.db).await?))
    }

    pub async fn set_status(&self, id: Uuid, status: TenantStatus) -> AppResult<Tenant> {
        let mut active: tenant::ActiveModel = self.find_model(id).await?.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());
        Ok(Tenant::from(active.update(self.db).await?))
    }

    /// Persist the lazy expiry of an overdue trial. Only a tenant still on
    /// `trial` is touched; false when another writer moved it first.
    pub async fn expire_trial(&self, id: Uuid) -> AppResult<bool> {
        let result = tenant::Entity::update_many()
            .col_expr(tenant::Column::Status, Expr::value(TenantStatus::Expired.as_str()))
            .col_expr(tenant::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(tenant::Column::Id.eq(id))
            .filter(tenant::Column::Status.eq(TenantStatus::Trial.as_str()))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Move the tenant to a paid plan and mark the trial converted.
    pub async fn change_plan(&self, id: Uuid, plan_id: Uuid, status: TenantStatus) -> AppResult<Tenant> {
        let mut active: tenant::ActiveModel = self.find_model(id).await?.into();
        active.plan_id = Set(plan_id);
        active.status = Set(status.as_str().to_string());
        active.trial_converted = Set(true);
        active.updated_at = Set(Utc::now());
        Ok(Tenant::from(active.update(self.db).await?))
    }

    pub async fn set_custom_limits(&self, id: Uuid, limits: Option<&LimitSet>) -> AppResult<Tenant> {
        let mut active: tenant::ActiveModel = self.find_model(id).await?.into();
        active.custom_limits = Set(limits.filter(|l| !l.is_empty()).map(LimitSet::to_json));
        active.updated_at = Set(Utc::now());
        Ok(Tenant::from(active.update(self.db).await?))
    }

    pub async fn list(&self, filter: &TenantFilter, page: u64, limit: u64) -> AppResult<Paginated<Tenant>> {
        let mut query = tenant::Entity::find().order_by_desc(tenant::Column::CreatedAt);

        if let Some(status) = filter.status {
            query = query.filter(tenant::Column::Status.eq(status.as_str()));
        }
        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.filter(
                contains_ci(tenant::Column::Name, term).or(contains_ci(tenant::Column::Slug, term)),
            );
        }

        fetch_page(self.db, query, page, limit).await
    }

    pub async fn all(&self) -> AppResult<Vec<Tenant>> {
        let models = tenant::Entity::find()
            .order_by_asc(tenant::Column::CreatedAt)
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(Tenant::from).collect())
    }

    pub async fn count_on_plan(&self, plan_id: Uuid) -> AppResult<u64> {
        Ok(tenant::Entity::find()
            .filter(tenant::Column::PlanId.eq(plan_id))
            .count(self.db)
            .await?)
    }
}

pub struct PlanStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> PlanStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        let model = plan::Entity::find_by_id(id).one(self.db).await?;
        Ok(model.map(Plan::from))
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Plan>> {
        let model = plan::Entity::find()
            .filter(plan::Column::Name.eq(name))
            .one(self.db)
            .await?;
        Ok(model.map(Plan::from))
    }

    pub async fn list(&self) -> AppResult<Vec<Plan>> {
        let models = plan::Entity::find()
            .order_by_asc(plan::Column::Price)
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(Plan::from).collect())
    }

    pub async fn create(&self, input: CreatePlan) -> AppResult<Plan> {
        let now = Utc::now();
        let model = plan::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            display_name: Set(input.display_name),
            description: Set(input.description),
            price: Set(input.price),
            billing_cycle: Set(input.billing_cycle.as_str().to_string()),
            features: Set(input.features.to_json()),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(Plan::from(model))
    }

    pub async fn update(&self, id: Uuid, input: UpdatePlan) -> AppResult<Plan> {
        let model = plan::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_not_found("Plan")?;

        let mut active: plan::ActiveModel = model.into();
        if let Some(display_name) = input.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(cycle) = input.billing_cycle {
            active.billing_cycle = Set(cycle.as_str().to_string());
        }
        if let Some(features) = input.features {
            active.features = Set(features.to_json());
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(Plan::from(active.update(self.db).await?))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = plan::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Plan"));
        }
        Ok(())
    }
}

pub struct ModuleStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> ModuleStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn all(&self) -> AppResult<Vec<module::Model>> {
        Ok(module::Entity::find()
            .order_by_asc(module::Column::Name)
            .all(self.db)
            .await?)
    }

    /// Insert the module unless one with the same name exists.
    pub async fn ensure(&self, name: &str, display_name: &str) -> AppResult<bool> {
        let exists = module::Entity::find()
            .filter(module::Column::Name.eq(name))
            .count(self.db)
            .await?
            > 0;
        if exists {
            return Ok(false);
        }

        module::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            display_name: Set(display_name.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.db)
        .await?;
        Ok(true)
    }

    pub async fn enable(&self, tenant_id: Uuid, module_id: Uuid) -> AppResult<()> {
        tenant_module::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            module_id: Set(module_id),
            is_enabled: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(self.db)
        .await?;
        Ok(())
    }

    pub async fn enabled_for(&self, tenant_id: Uuid) -> AppResult<Vec<EnabledModule>> {
        let module_ids: Vec<Uuid> = tenant_module::Entity::find()
            .filter(tenant_module::Column::TenantId.eq(tenant_id))
            .filter(tenant_module::Column::IsEnabled.eq(true))
            .all(self.db)
            .await?
            .into_iter()
            .map(|row| row.module_id)
            .collect();

        if module_ids.is_empty() {
            return Ok(Vec::new());
        }

        let modules = module::Entity::find()
            .filter(module::Column::Id.is_in(module_ids))
            .order_by_asc(module::Column::Name)
            .all(self.db)
            .await?;

        Ok(modules
            .into_iter()
            .map(|m| EnabledModule {
                name: m.name,
                display_name: m.display_name,
            })
            .collect())
    }
}
