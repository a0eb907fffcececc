//! Tenant entity.

use sea_orm::entity::prelude::*;

use crate::domain::Tenant;
use policy::{BusinessType, LimitSet, TenantStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub business_type: String,
    pub status: String,
    pub plan_id: Uuid,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub custom_limits: Option<Json>,
    pub trial_start_date: Option<DateTimeUtc>,
    pub trial_end_date: Option<DateTimeUtc>,
    pub trial_converted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Tenant {
    fn from(model: Model) -> Self {
        let custom_limits = model.custom_limits.as_ref().and_then(|value| {
            LimitSet::from_json(value)
                .map_err(|e| tracing::warn!(tenant = %model.id, error = %e, "Ignoring unparseable custom limits"))
                .ok()
        });

        Tenant {
            id: model.id,
            status: super::parse_column(&model.status, TenantStatus::Suspended, "tenants.status"),
            business_type: super::parse_column(&model.business_type, BusinessType::Inventory, "tenants.business_type"),
            name: model.name,
            slug: model.slug,
            plan_id: model.plan_id,
            custom_limits,
            trial_start_date: model.trial_start_date,
            trial_end_date: model.trial_end_date,
            trial_converted: model.trial_converted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
