//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REDIS_URL, DEFAULT_SEED_ADMIN_EMAIL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, ENV_DEVELOPMENT, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    admin_jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub app_env: String,
    pub seed_admin_email: String,
    seed_admin_password: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("admin_jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("app_env", &self.app_env)
            .field("seed_admin_email", &self.seed_admin_email)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a JWT secret is missing in release builds or is too short.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = secret_from_env("JWT_SECRET", "dev-secret-key-minimum-32-chars!!");
        let admin_jwt_secret =
            secret_from_env("ADMIN_JWT_SECRET", "dev-admin-secret-minimum-32-chars!");

        if jwt_secret == admin_jwt_secret {
            panic!("ADMIN_JWT_SECRET must differ from JWT_SECRET");
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            admin_jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            seed_admin_email: env::var("SEED_ADMIN_EMAIL")
                .unwrap_or_else(|_| DEFAULT_SEED_ADMIN_EMAIL.to_string()),
            seed_admin_password: env::var("SEED_ADMIN_PASSWORD").ok(),
        }
    }

    /// Configuration for local runs and tests: fixed secrets, development mode.
    pub fn local(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: "local-tenant-secret-at-least-32-chars".to_string(),
            admin_jwt_secret: "local-admin-secret-at-least-32-chars!".to_string(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            app_env: ENV_DEVELOPMENT.to_string(),
            seed_admin_email: DEFAULT_SEED_ADMIN_EMAIL.to_string(),
            seed_admin_password: None,
        }
    }

    /// Secret used to sign tenant user tokens.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Secret used to sign platform admin tokens.
    pub fn admin_jwt_secret_bytes(&self) -> &[u8] {
        self.admin_jwt_secret.as_bytes()
    }

    pub fn seed_admin_password(&self) -> Option<&str> {
        self.seed_admin_password.as_deref()
    }

    /// Set the password the seed gives the first platform admin.
    pub fn with_seed_admin_password(mut self, password: impl Into<String>) -> Self {
        self.seed_admin_password = Some(password.into());
        self
    }

    /// Whether internal error details may be returned to clients.
    pub fn is_development(&self) -> bool {
        self.app_env == ENV_DEVELOPMENT
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn secret_from_env(key: &str, dev_default: &str) -> String {
    let secret = env::var(key).unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            tracing::warn!("{} not set, using insecure default for development", key);
            dev_default.to_string()
        } else {
            panic!("{} environment variable must be set in production", key);
        }
    });

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        panic!("{} must be at least {} characters long", key, MIN_JWT_SECRET_LENGTH);
    }

    secret
}
