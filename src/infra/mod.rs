//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and tenant-scoped stores
//! - Redis counters for rate limiting
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod unit_of_work;

pub use cache::{Cache, RateLimitStore};
pub use db::{Database, Migrator};
pub use repositories::Repos;
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockRateLimitStore;
