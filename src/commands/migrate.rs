//! Migrate command - Schema management for the platform database.

use sea_orm::DbErr;

use super::seed;
use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

fn failed(step: &str) -> impl Fn(DbErr) -> AppError + '_ {
    move |e| AppError::internal(format!("{} failed: {}", step, e))
}

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(failed("Database connection"))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(failed("Migration"))?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(failed("Rollback"))?;
            tracing::info!("Rolled back the latest migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(failed("Status check"))?;
            let pending = status.iter().filter(|(_, applied)| !applied).count();
            for (name, applied) in &status {
                println!("{}: {}", name, if *applied { "applied" } else { "pending" });
            }
            tracing::info!(total = status.len(), pending, "Migration status");
        }
        MigrateAction::Fresh => rebuild(&db, &config).await?,
    }

    Ok(())
}

/// Drop and recreate the schema. Signup needs the trial plan, so the
/// reference data is seeded again.
pub(crate) async fn rebuild(db: &Database, config: &Config) -> AppResult<()> {
    tracing::warn!("Dropping every table and rebuilding the schema");
    db.fresh_migrations().await.map_err(failed("Fresh migration"))?;
    seed::run(db, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnectOptions;

    use crate::infra::{Persistence, UnitOfWork};
    use policy::TRIAL_PLAN_NAME;

    #[tokio::test]
    async fn test_rebuild_restores_reference_data() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let connection = sea_orm::Database::connect(options).await.unwrap();
        let db = Database::from_connection(connection.clone());
        let config = Config::local("sqlite::memory:");

        rebuild(&db, &config).await.unwrap();
        // Second run drops the seeded rows and puts them back
        rebuild(&db, &config).await.unwrap();

        let uow = Persistence::new(connection);
        let plans = uow.repos().plans().list().await.unwrap();
        assert_eq!(plans.len(), 4);
        assert!(plans.iter().any(|p| p.name == TRIAL_PLAN_NAME));
    }
}
