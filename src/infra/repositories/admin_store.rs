//! Platform admins and the audit trail.
//!
//! These stores are never reached through a tenant context.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{audit_log, platform_admin};
use super::fetch_page;
use crate::domain::{AuditEntry, AuditFilter, NewAuditEntry, PlatformAdmin};
use crate::errors::{AppResult, OptionExt};
use crate::types::Paginated;

pub struct AdminStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> AdminStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PlatformAdmin>> {
        let model = platform_admin::Entity::find_by_id(id).one(self.db).await?;
        Ok(model.map(PlatformAdmin::from))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<PlatformAdmin>> {
        let model = platform_admin::Entity::find()
            .filter(platform_admin::Column::Email.eq(email))
            .one(self.db)
            .await?;
        Ok(model.map(PlatformAdmin::from))
    }

    pub async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<PlatformAdmin> {
        let now = Utc::now();
        let model = platform_admin::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            name: Set(name),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(PlatformAdmin::from(model))
    }

    pub async fn touch_login(&self, id: Uuid) -> AppResult<()> {
        let model = platform_admin::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_not_found("Admin")?;

        let mut active: platform_admin::ActiveModel = model.into();
        active.last_login_at = Set(Some(Utc::now()));
        active.update(self.db).await?;
        Ok(())
    }
}

/// Append-only: there is no update or delete.
pub struct AuditStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> AuditStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn append(&self, entry: NewAuditEntry) -> AppResult<AuditEntry> {
        let model = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            admin_id: Set(entry.admin_id),
            action: Set(entry.action.to_string()),
            target_type: Set(entry.target_type.to_string()),
            target_id: Set(entry.target_id),
            details: Set(entry.details),
            created_at: Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        Ok(AuditEntry::from(model))
    }

    pub async fn list(&self, filter: &AuditFilter, page: u64, limit: u64) -> AppResult<Paginated<AuditEntry>> {
        let mut query = audit_log::Entity::find().order_by_desc(audit_log::Column::CreatedAt);

        if let Some(target_type) = &filter.target_type {
            query = query.filter(audit_log::Column::TargetType.eq(target_type.as_str()));
        }
        if let Some(action) = &filter.action {
            query = query.filter(audit_log::Column::Action.eq(action.as_str()));
        }

        fetch_page(self.db, query, page, limit).await
    }

    pub async fn for_target(&self, target_id: Uuid) -> AppResult<Vec<AuditEntry>> {
        let models = audit_log::Entity::find()
            .filter(audit_log::Column::TargetId.eq(target_id))
            .order_by_desc(audit_log::Column::CreatedAt)
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(AuditEntry::from).collect())
    }
}
