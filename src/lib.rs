//! BizHub - Multi-tenant business management backend
//!
//! Each tenant is an isolated business with its own users, inventory, hotel
//! floor, expenses and storefront. Plans cap what a tenant may create, and
//! platform operators manage tenants across the whole installation.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and request shapes
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, Redis, seed data)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **utils**: Utility functions and helpers
//! - **errors**: Centralized error handling
//!
//! Pure policy rules (limits, roles, tenant status, coupons) live in the
//! `policy` workspace crate.
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Insert plans, modules and the platform admin
//! cargo run -- seed
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{AdminContext, TenantContext, User};
pub use errors::{AppError, AppResult};
pub use policy::{Password, Role};
