//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod cart_handler;
pub mod catalog_handler;
pub mod coupon_handler;
pub mod expense_handler;
pub mod health_handler;
pub mod hotel_handler;
pub mod inventory_handler;
pub mod order_handler;
pub mod tenant_handler;
pub mod user_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use cart_handler::cart_routes;
pub use catalog_handler::{category_routes, product_routes};
pub use coupon_handler::coupon_routes;
pub use expense_handler::expense_routes;
pub use health_handler::health_check;
pub use hotel_handler::hotel_routes;
pub use inventory_handler::inventory_routes;
pub use order_handler::order_routes;
pub use tenant_handler::{billing_routes, tenant_routes};
pub use user_handler::user_routes;
