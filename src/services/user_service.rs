//! User service - Staff accounts inside a tenant.
//!
//! Owners and admins manage accounts; the owner account itself can be neither
//! edited through here nor deactivated.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::entitlements;
use crate::domain::{ChangePassword, CreateUser, TenantContext, UpdateUser, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::NewUser;
use crate::infra::UnitOfWork;
use crate::types::Paginated;
use crate::with_transaction;
use policy::{LimitKey, Password, Role, MANAGERS};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a staff account, subject to the plan's `maxUsers`
    async fn create_user(&self, ctx: &TenantContext, input: CreateUser) -> AppResult<User>;

    async fn list_users(
        &self,
        ctx: &TenantContext,
        search: Option<String>,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<User>>;

    async fn get_user(&self, ctx: &TenantContext, id: Uuid) -> AppResult<User>;

    async fn update_user(&self, ctx: &TenantContext, id: Uuid, input: UpdateUser) -> AppResult<User>;

    async fn deactivate_user(&self, ctx: &TenantContext, id: Uuid) -> AppResult<User>;

    /// Change the caller's own password
    async fn change_password(&self, ctx: &TenantContext, input: ChangePassword) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> AppResult<()> {
        match self.uow.repos().users().find_by_email(email).await? {
            Some(user) if Some(user.id) != except => {
                Err(AppError::conflict("Email is already registered"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn create_user(&self, ctx: &TenantContext, input: CreateUser) -> AppResult<User> {
        ctx.require(MANAGERS)?;
        if input.role == Role::Owner {
            return Err(AppError::validation("A tenant has exactly one owner"));
        }

        let email = input.email.trim().to_lowercase();
        self.ensure_email_free(&email, None).await?;
        let password_hash = Password::new(&input.password)?.into_string();
        let tenant_id = ctx.tenant_id;

        let user = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let (tenant, plan) = entitlements::lock_tenant(repos, tenant_id).await?;
            let current = repos.users().count(tenant_id).await?;
            entitlements::ensure_capacity(&tenant, &plan, LimitKey::MaxUsers, current)?;

            repos
                .users()
                .create(NewUser {
                    tenant_id,
                    email,
                    password_hash,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    role: input.role,
                })
                .await
        })?;

        tracing::info!(tenant_id = %tenant_id, user_id = %user.id, "User created");
        Ok(user)
    }

    async fn list_users(
        &self,
        ctx: &TenantContext,
        search: Option<String>,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<User>> {
        self.uow
            .repos()
            .users()
            .list(ctx.tenant_id, search.as_deref(), page, limit)
            .await
    }

    async fn get_user(&self, ctx: &TenantContext, id: Uuid) -> AppResult<User> {
        self.uow
            .repos()
            .users()
            .find(ctx.tenant_id, id)
            .await?
            .ok_or_not_found("User")
    }

    async fn update_user(&self, ctx: &TenantContext, id: Uuid, mut input: UpdateUser) -> AppResult<User> {
        ctx.require(MANAGERS)?;
        let user = self.get_user(ctx, id).await?;

        if user.is_owner() {
            return Err(AppError::validation("The owner account cannot be modified"));
        }
        if input.role == Some(Role::Owner) {
            return Err(AppError::validation("A tenant has exactly one owner"));
        }
        if let Some(email) = input.email.as_mut() {
            *email = email.trim().to_lowercase();
            self.ensure_email_free(email, Some(id)).await?;
        }

        self.uow.repos().users().update(ctx.tenant_id, id, input).await
    }

    async fn deactivate_user(&self, ctx: &TenantContext, id: Uuid) -> AppResult<User> {
        ctx.require(MANAGERS)?;
        let user = self.get_user(ctx, id).await?;

        if user.is_owner() {
            return Err(AppError::validation("The owner account cannot be deactivated"));
        }
        if user.id == ctx.user_id {
            return Err(AppError::validation("You cannot deactivate your own account"));
        }

        let user = self.uow.repos().users().set_active(ctx.tenant_id, id, false).await?;
        tracing::info!(tenant_id = %ctx.tenant_id, user_id = %id, "User deactivated");
        Ok(user)
    }

    async fn change_password(&self, ctx: &TenantContext, input: ChangePassword) -> AppResult<()> {
        let user = self.get_user(ctx, ctx.user_id).await?;

        if !Password::from_hash(user.password_hash).verify(&input.current_password) {
            return Err(AppError::validation("Current password is incorrect"));
        }

        let password_hash = Password::new(&input.new_password)?.into_string();
        self.uow
            .repos()
            .users()
            .set_password(ctx.tenant_id, ctx.user_id, password_hash)
            .await
    }
}
