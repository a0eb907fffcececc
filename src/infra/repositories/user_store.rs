//! Tenant user accounts.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::{contains_ci, fetch_page};
use crate::domain::{UpdateUser, User};
use crate::errors::{AppResult, OptionExt};
use crate::types::Paginated;
use policy::Role;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

pub struct UserStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> UserStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Lookup across all tenants. Only login and registration use this:
    /// emails are globally unique.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await?;
        Ok(model.map(User::from))
    }

    /// Session lookup: the token's user must still belong to the token's tenant.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<User>> {
        let model = UserEntity::find_by_id(id)
            .filter(user::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;
        Ok(model.map(User::from))
    }

    pub async fn create(&self, new: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(new.tenant_id),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            role: Set(new.role.as_str().to_string()),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(User::from(model))
    }

    async fn find_model(&self, tenant_id: Uuid, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .filter(user::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .ok_or_not_found("User")
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateUser) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(tenant_id, id).await?.into();

        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(role) = input.role {
            active.role = Set(role.as_str().to_string());
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(User::from(active.update(self.db).await?))
    }

    pub async fn set_active(&self, tenant_id: Uuid, id: Uuid, is_active: bool) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(tenant_id, id).await?.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        Ok(User::from(active.update(self.db).await?))
    }

    pub async fn set_password(&self, tenant_id: Uuid, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(tenant_id, id).await?.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        active.update(self.db).await?;
        Ok(())
    }

    pub async fn touch_login(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(tenant_id, id).await?.into();
        active.last_login_at = Set(Some(Utc::now()));
        active.update(self.db).await?;
        Ok(())
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        search: Option<&str>,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<User>> {
        let mut query = UserEntity::find()
            .filter(user::Column::TenantId.eq(tenant_id))
            .order_by_asc(user::Column::CreatedAt);

        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            query = query.filter(
                contains_ci(user::Column::Email, term)
                    .or(contains_ci(user::Column::FirstName, term))
                    .or(contains_ci(user::Column::LastName, term)),
            );
        }

        fetch_page(self.db, query, page, limit).await
    }

    pub async fn list_all(&self, tenant_id: Uuid) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::TenantId.eq(tenant_id))
            .order_by_asc(user::Column::CreatedAt)
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    /// Counted against `maxUsers`
    pub async fn count(&self, tenant_id: Uuid) -> AppResult<u64> {
        Ok(UserEntity::find()
            .filter(user::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await?)
    }

    /// Users on every tenant (admin analytics)
    pub async fn count_all(&self) -> AppResult<u64> {
        Ok(UserEntity::find().count(self.db).await?)
    }
}
