//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{admin_auth_middleware, tenant_auth_middleware, tenant_billing_auth_middleware};
pub use rate_limit::{rate_limit_auth_middleware, rate_limit_middleware, RateLimitError};
