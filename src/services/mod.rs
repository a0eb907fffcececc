//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and the stores. Tenant-scoped services
//! take a [`TenantContext`](crate::domain::TenantContext) on every call and
//! never read across tenants; only [`AdminService`] does.
//!
//! All services use the Unit of Work pattern for repository access and
//! transaction management.

mod admin_service;
mod auth_service;
mod cart_service;
mod catalog_service;
pub mod container;
mod coupon_service;
mod entitlements;
mod expense_service;
mod hotel_service;
mod inventory_service;
mod order_service;
mod tenant_service;
pub mod tokens;
mod user_service;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use admin_service::{AdminManager, AdminService, AdminSession};
pub use auth_service::{AuthService, AuthSession, Authenticator};
pub use cart_service::{CartManager, CartService};
pub use catalog_service::{CatalogManager, CatalogService};
pub use coupon_service::{CouponManager, CouponRemoval, CouponService};
pub use expense_service::{ExpenseManager, ExpenseService};
pub use hotel_service::{HotelManager, HotelService};
pub use inventory_service::{InventoryManager, InventoryService};
pub use order_service::{OrderManager, OrderService};
pub use tenant_service::{TenantManager, TenantService};
pub use tokens::{AdminClaims, Claims, TokenIssuer, TokenResponse};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use admin_service::MockAdminService;
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use cart_service::MockCartService;
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_service::MockCatalogService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use coupon_service::MockCouponService;
#[cfg(any(test, feature = "test-utils"))]
pub use expense_service::MockExpenseService;
#[cfg(any(test, feature = "test-utils"))]
pub use hotel_service::MockHotelService;
#[cfg(any(test, feature = "test-utils"))]
pub use inventory_service::MockInventoryService;
#[cfg(any(test, feature = "test-utils"))]
pub use order_service::MockOrderService;
#[cfg(any(test, feature = "test-utils"))]
pub use tenant_service::MockTenantService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
