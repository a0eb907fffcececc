//! Reference data: plans, modules and the first platform admin.
//!
//! Every step checks before inserting, so running the seed twice is a no-op.

use rust_decimal::Decimal;
use serde_json::json;

use super::UnitOfWork;
use crate::config::{Config, MODULES};
use crate::domain::CreatePlan;
use crate::errors::AppResult;
use crate::with_transaction;
use policy::{BillingCycle, Password, PlanFeatures, TRIAL_PLAN_NAME};

/// What a seed run inserted
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub plans_created: usize,
    pub modules_created: usize,
    pub admin_created: bool,
}

/// Default plan catalogue
pub fn default_plans() -> AppResult<Vec<CreatePlan>> {
    let plan = |name: &str,
                display: &str,
                price: Decimal,
                cycle: BillingCycle,
                features: serde_json::Value|
     -> AppResult<CreatePlan> {
        Ok(CreatePlan {
            name: name.to_string(),
            display_name: display.to_string(),
            description: None,
            price,
            billing_cycle: cycle,
            features: PlanFeatures::from_json(&features)?,
            is_active: Some(true),
        })
    };

    Ok(vec![
        plan(
            TRIAL_PLAN_NAME,
            "Free Trial",
            Decimal::ZERO,
            BillingCycle::Trial,
            json!({ "maxProducts": 50, "maxUsers": 2, "maxTables": 5, "maxStorageMB": 50, "trialDurationDays": 60 }),
        )?,
        plan(
            "basic",
            "Basic",
            Decimal::new(999, 2),
            BillingCycle::Monthly,
            json!({ "maxProducts": 100, "maxUsers": 2, "maxTables": 10, "maxStorageMB": 100 }),
        )?,
        plan(
            "pro",
            "Pro",
            Decimal::new(2999, 2),
            BillingCycle::Monthly,
            json!({ "maxProducts": 1000, "maxUsers": 10, "maxTables": 50, "maxStorageMB": 1000 }),
        )?,
        plan(
            "enterprise",
            "Enterprise",
            Decimal::new(9999, 2),
            BillingCycle::Monthly,
            json!({ "maxProducts": -1, "maxUsers": -1, "maxTables": -1, "maxStorageMB": -1 }),
        )?,
    ])
}

/// Insert whatever reference data is missing.
pub async fn run<U: UnitOfWork>(uow: &U, config: &Config) -> AppResult<SeedReport> {
    let plans = default_plans()?;
    let admin_email = config.seed_admin_email.clone();
    let admin_password = match config.seed_admin_password() {
        Some(plain) => Some(Password::new(plain)?),
        None => {
            tracing::warn!("SEED_ADMIN_PASSWORD not set, skipping platform admin");
            None
        }
    };

    let report = with_transaction!(uow, |ctx| {
        let repos = ctx.repos();
        let mut report = SeedReport::default();

        for plan in plans {
            if repos.plans().find_by_name(&plan.name).await?.is_none() {
                tracing::info!(plan = %plan.name, "Seeding plan");
                repos.plans().create(plan).await?;
                report.plans_created += 1;
            }
        }

        for (name, display_name) in MODULES {
            if repos.modules().ensure(name, display_name).await? {
                report.modules_created += 1;
            }
        }

        if let Some(password) = admin_password {
            if repos.admins().find_by_email(&admin_email).await?.is_none() {
                tracing::info!(email = %admin_email, "Seeding platform admin");
                repos
                    .admins()
                    .create(admin_email, password.into_string(), "Platform Admin".to_string())
                    .await?;
                report.admin_created = true;
            }
        }

        Ok(report)
    })?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy::{Limit, LimitKey};

    #[test]
    fn test_default_plans() {
        let plans = default_plans().unwrap();
        assert_eq!(plans.len(), 4);

        let trial = &plans[0];
        assert_eq!(trial.name, TRIAL_PLAN_NAME);
        assert_eq!(trial.features.trial_duration_days, Some(60));

        let enterprise = &plans[3];
        assert_eq!(enterprise.features.limits().get(LimitKey::MaxUsers), Some(Limit::Unlimited));
    }
}
