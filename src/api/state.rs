//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, RateLimitStore};
use crate::services::{ServiceContainer, Services};

/// Application state shared by every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Business services
    pub services: Arc<dyn ServiceContainer>,
    /// Request counters (Redis in production)
    pub rate_limits: Arc<dyn RateLimitStore>,
    /// Database handle, used for health checks
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the production service container over the database connection.
    pub fn from_config(
        database: Arc<Database>,
        rate_limits: Arc<dyn RateLimitStore>,
        config: Config,
    ) -> Self {
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            config,
        ));

        Self {
            services,
            rate_limits,
            database,
        }
    }

    /// Create state with manually injected services (tests, custom wiring).
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        rate_limits: Arc<dyn RateLimitStore>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            services,
            rate_limits,
            database,
        }
    }
}
