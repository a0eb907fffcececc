//! Platform operator entity, separate from tenant users.

use sea_orm::entity::prelude::*;

use crate::domain::PlatformAdmin;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "platform_admins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PlatformAdmin {
    fn from(model: Model) -> Self {
        PlatformAdmin {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            name: model.name,
            is_active: model.is_active,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
        }
    }
}
