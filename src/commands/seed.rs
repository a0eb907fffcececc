//! Seed command - Reference data for a fresh deployment.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{seed, Database, Persistence};

/// Apply migrations, then insert whatever plans, modules and admin are missing
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    run(&db, &config).await
}

pub(crate) async fn run(db: &Database, config: &Config) -> AppResult<()> {
    let uow = Persistence::new(db.get_connection());
    let report = seed::run(&uow, config).await?;

    tracing::info!(
        plans = report.plans_created,
        modules = report.modules_created,
        admin = report.admin_created,
        "Seed completed"
    );

    Ok(())
}
