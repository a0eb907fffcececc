//! Subscription plan entity.

use sea_orm::entity::prelude::*;

use crate::domain::Plan;
use policy::PlanFeatures;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub billing_cycle: String,
    /// Open JSON map of limit name to integer; -1 means unlimited
    #[sea_orm(column_type = "JsonBinary")]
    pub features: Json,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Plan {
    fn from(model: Model) -> Self {
        let features = PlanFeatures::from_json(&model.features).unwrap_or_else(|e| {
            tracing::warn!(plan = %model.name, error = %e, "Unparseable plan features");
            PlanFeatures::default()
        });

        Plan {
            id: model.id,
            billing_cycle: super::parse_column(&model.billing_cycle, policy::BillingCycle::Monthly, "plans.billing_cycle"),
            name: model.name,
            display_name: model.display_name,
            description: model.description,
            price: model.price,
            features,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
