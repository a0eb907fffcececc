//! Shared setup for integration tests: an in-memory SQLite database with
//! migrations and reference data applied, wired into the real services.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbBackend,
    Statement,
};
use sea_orm_migration::MigratorTrait;

use bizhub::config::Config;
use bizhub::domain::{AdminContext, CreateInventoryProduct, RegisterTenant, TenantContext};
use bizhub::errors::AppResult;
use bizhub::infra::{seed, Database, Migrator, Persistence, RateLimitStore};
use bizhub::services::{AuthSession, ServiceContainer, Services};
use bizhub::AppState;
use policy::BusinessType;
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "operator-password-123";
pub const OWNER_PASSWORD: &str = "owner-password-123";

/// Counter store that never limits
pub struct Unlimited;

#[async_trait]
impl RateLimitStore for Unlimited {
    async fn check_rate_limit(&self, _: &str, _: u64, _: u64) -> AppResult<(u64, bool)> {
        Ok((1, true))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub config: Config,
    pub services: Services,
}

impl TestApp {
    pub async fn new() -> Self {
        // One connection: every pooled connection to sqlite::memory: is its own database
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = SeaDatabase::connect(options)
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let config =
            Config::local("sqlite::memory:").with_seed_admin_password(ADMIN_PASSWORD);
        seed::run(&Persistence::new(db.clone()), &config)
            .await
            .expect("Failed to seed reference data");

        let services = Services::from_connection(db.clone(), config.clone());
        Self { db, config, services }
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            Arc::new(self.services.clone()),
            Arc::new(Unlimited),
            Arc::new(Database::from_connection(self.db.clone())),
        )
    }

    pub async fn register(&self, slug: &str) -> AuthSession {
        self.services
            .auth()
            .register(registration(slug))
            .await
            .expect("Registration failed")
    }

    /// Register `slug` and resolve its owner the way the auth middleware does.
    pub async fn owner(&self, slug: &str) -> (AuthSession, TenantContext) {
        let session = self.register(slug).await;
        let ctx = self.tenant_context(&session.token.access_token).await;
        (session, ctx)
    }

    pub async fn tenant_context(&self, token: &str) -> TenantContext {
        let auth = self.services.auth();
        let claims = auth.verify_token(token).expect("Token rejected");
        auth.authenticate(&claims).await.expect("Authentication failed")
    }

    pub async fn admin(&self) -> AdminContext {
        let admin = self.services.admin();
        let session = admin
            .login(self.config.seed_admin_email.clone(), ADMIN_PASSWORD.to_string())
            .await
            .expect("Admin login failed");
        let claims = admin
            .verify_token(&session.token.access_token)
            .expect("Admin token rejected");
        admin.authenticate(&claims).await.expect("Admin authentication failed")
    }

    /// Put the tenant's trial end a day in the past.
    pub async fn backdate_trial(&self, tenant_id: Uuid) {
        let past = Utc::now() - Duration::days(1);
        self.db
            .execute(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                "UPDATE tenants SET trial_end_date = ? WHERE id = ?",
                [past.into(), tenant_id.into()],
            ))
            .await
            .expect("Failed to backdate trial");
    }

    /// Move the tenant onto the named paid plan.
    pub async fn upgrade(&self, ctx: &TenantContext, plan_name: &str) {
        let plans = self
            .services
            .tenants()
            .available_plans()
            .await
            .expect("Failed to list plans");
        let plan = plans
            .into_iter()
            .find(|p| p.name == plan_name)
            .expect("Plan not seeded");
        self.services
            .tenants()
            .upgrade(ctx, plan.id)
            .await
            .expect("Upgrade failed");
    }
}

pub fn registration(slug: &str) -> RegisterTenant {
    RegisterTenant {
        tenant_name: format!("{} Ltd", slug),
        slug: slug.to_string(),
        business_type: BusinessType::Inventory,
        first_name: "Olive".to_string(),
        last_name: Some("Owner".to_string()),
        email: format!("owner@{}.test", slug),
        password: OWNER_PASSWORD.to_string(),
    }
}

pub fn inventory_item(name: &str) -> CreateInventoryProduct {
    CreateInventoryProduct {
        name: name.to_string(),
        sku: None,
        category: Some("General".to_string()),
        description: None,
        unit_price: Decimal::new(500, 2),
        cost_price: None,
        stock: 10,
        low_stock_threshold: None,
        unit: None,
    }
}
