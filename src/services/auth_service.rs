//! Authentication service - Tenant signup, login and session checks.
//!
//! A session is only as good as the tenant behind it: every authenticated
//! request re-reads the user and tenant, so suspension and trial expiry take
//! effect on tokens that were issued before the change.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::tokens::{Claims, TokenIssuer, TokenResponse};
use crate::config::Config;
use crate::domain::{Plan, Profile, RegisterTenant, Tenant, TenantContext, TenantSummary, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::{NewTenant, NewUser};
use crate::infra::UnitOfWork;
use crate::utils::ensure_slug;
use crate::with_transaction;
use policy::{login_gate, trial_end, LoginDecision, Password, Role, TenantStatus, TRIAL_PLAN_NAME};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const TRIAL_EXPIRED: &str = "Your trial has expired. Please upgrade to continue.";
const TENANT_SUSPENDED: &str = "Your account has been suspended. Please contact support.";
const USER_DEACTIVATED: &str = "Your account has been deactivated";

/// Verified against when the email is unknown, so a miss costs as much as a
/// wrong password.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("timing-equalizer-password")
        .map(Password::into_string)
        .unwrap_or_default()
});

/// Hash to verify against when no account matches the email
pub(crate) fn dummy_hash() -> String {
    DUMMY_HASH.clone()
}

/// Tenant states a session is admitted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Trial and active tenants only
    Full,
    /// Also expired tenants, for choosing a plan
    Billing,
}

/// Token plus the identity it was issued for
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    #[serde(flatten)]
    pub token: TokenResponse,
    pub user: User,
    pub tenant: TenantSummary,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a tenant on the trial plan together with its owner account
    async fn register(&self, input: RegisterTenant) -> AppResult<AuthSession>;

    /// Check credentials and the tenant's status, then issue a token
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Like `login`, but also admits an expired tenant so its owner can
    /// reach the plan upgrade
    async fn billing_login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Verify a tenant token's signature, expiry and type
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Re-validate the session behind verified claims
    async fn authenticate(&self, claims: &Claims) -> AppResult<TenantContext>;

    /// Session check for the billing routes: an expired tenant passes,
    /// a suspended one does not
    async fn authenticate_for_billing(&self, claims: &Claims) -> AppResult<TenantContext>;

    /// The caller with their tenant and enabled modules
    async fn profile(&self, ctx: &TenantContext) -> AppResult<Profile>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: TokenIssuer,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self {
            uow,
            tokens: TokenIssuer::new(config),
        }
    }

    /// Apply the tenant gate and the user's own flag. Lazily moves an
    /// overdue trial to `expired`.
    async fn admit(&self, user: &User, gate: Gate) -> AppResult<(Tenant, Plan)> {
        let repos = self.uow.repos();
        let mut tenant = repos
            .tenants()
            .find_by_id(user.tenant_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if login_gate(tenant.status, tenant.trial_end_date, Utc::now()) == LoginDecision::ExpireTrial {
            if repos.tenants().expire_trial(tenant.id).await? {
                tracing::info!(tenant_id = %tenant.id, "Trial expired");
            }
            // Re-read: a suspension or upgrade may have landed first
            tenant = repos
                .tenants()
                .find_by_id(tenant.id)
                .await?
                .ok_or(AppError::Unauthorized)?;
        }

        match tenant.status {
            TenantStatus::Trial | TenantStatus::Active => {}
            TenantStatus::Expired if gate == Gate::Billing => {}
            TenantStatus::Expired => return Err(AppError::access_denied(TRIAL_EXPIRED)),
            TenantStatus::Suspended => return Err(AppError::access_denied(TENANT_SUSPENDED)),
        }

        if !user.is_active {
            return Err(AppError::access_denied(USER_DEACTIVATED));
        }

        let plan = repos
            .plans()
            .find_by_id(tenant.plan_id)
            .await?
            .ok_or_not_found("Plan")?;
        Ok((tenant, plan))
    }

    async fn sign_in(&self, email: String, password: String, gate: Gate) -> AppResult<AuthSession> {
        let email = email.trim().to_lowercase();
        let found = self.uow.repos().users().find_by_email(&email).await?;

        let hash = match &found {
            Some(user) => user.password_hash.clone(),
            None => dummy_hash(),
        };
        let password_valid = Password::from_hash(hash).verify(&password);

        let user = match found {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        let (tenant, plan) = self.admit(&user, gate).await?;
        self.uow.repos().users().touch_login(tenant.id, user.id).await?;

        self.session(user, &tenant, &plan)
    }

    async fn resolve(&self, claims: &Claims, gate: Gate) -> AppResult<TenantContext> {
        let user = self
            .uow
            .repos()
            .users()
            .find(claims.tenant_id, claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.admit(&user, gate).await?;

        Ok(TenantContext {
            tenant_id: user.tenant_id,
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }

    fn session(&self, user: User, tenant: &Tenant, plan: &Plan) -> AppResult<AuthSession> {
        let token = self
            .tokens
            .issue_tenant(user.id, tenant.id, &user.email, user.role)?;
        Ok(AuthSession {
            token,
            user,
            tenant: TenantSummary::new(tenant, plan, Utc::now()),
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterTenant) -> AppResult<AuthSession> {
        let slug = input.slug.trim().to_string();
        ensure_slug(&slug)?;
        let email = input.email.trim().to_lowercase();
        let password_hash = Password::new(&input.password)?.into_string();
        let now = Utc::now();

        let (user, tenant, plan) = with_transaction!(self.uow, |ctx| {
            let repos = ctx.repos();

            if repos.tenants().slug_exists(&slug).await? {
                return Err(AppError::conflict("Slug is already taken"));
            }
            if repos.users().find_by_email(&email).await?.is_some() {
                return Err(AppError::conflict("Email is already registered"));
            }

            let plan = repos
                .plans()
                .find_by_name(TRIAL_PLAN_NAME)
                .await?
                .ok_or_else(|| AppError::Configuration("Trial plan is not configured".into()))?;

            let tenant = repos
                .tenants()
                .create(NewTenant {
                    name: input.tenant_name,
                    slug,
                    business_type: input.business_type,
                    plan_id: plan.id,
                    trial_start_date: now,
                    trial_end_date: trial_end(now, plan.features.trial_duration_days),
                })
                .await?;

            let user = repos
                .users()
                .create(NewUser {
                    tenant_id: tenant.id,
                    email,
                    password_hash,
                    first_name: Some(input.first_name),
                    last_name: input.last_name,
                    role: Role::Owner,
                })
                .await?;

            for module in repos.modules().all().await? {
                repos.modules().enable(tenant.id, module.id).await?;
            }

            Ok((user, tenant, plan))
        })?;

        tracing::info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant registered");
        self.session(user, &tenant, &plan)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        self.sign_in(email, password, Gate::Full).await
    }

    async fn billing_login(&self, email: String, password: String) -> AppResult<AuthSession> {
        self.sign_in(email, password, Gate::Billing).await
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.tokens.verify_tenant(token)
    }

    async fn authenticate(&self, claims: &Claims) -> AppResult<TenantContext> {
        self.resolve(claims, Gate::Full).await
    }

    async fn authenticate_for_billing(&self, claims: &Claims) -> AppResult<TenantContext> {
        self.resolve(claims, Gate::Billing).await
    }

    async fn profile(&self, ctx: &TenantContext) -> AppResult<Profile> {
        let repos = self.uow.repos();
        let user = repos
            .users()
            .find(ctx.tenant_id, ctx.user_id)
            .await?
            .ok_or_not_found("User")?;
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
        let modules = repos.modules().enabled_for(ctx.tenant_id).await?;

        Ok(Profile {
            user,
            tenant: TenantSummary::new(&tenant, &plan, Utc::now()),
            modules,
        })
    }
}
