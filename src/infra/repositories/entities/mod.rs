//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models. Enum-like
//! columns are stored as text and parsed on the way out.

use std::str::FromStr;

pub mod audit_log;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod coupon;
pub mod expense;
pub mod hotel_table;
pub mod inventory_product;
pub mod module;
pub mod order;
pub mod order_item;
pub mod plan;
pub mod platform_admin;
pub mod reservation;
pub mod shop_product;
pub mod stock_movement;
pub mod tenant;
pub mod tenant_module;
pub mod user;

/// Parse a text column into its enum, falling back (and logging) on values
/// written outside this application.
fn parse_column<T: FromStr>(raw: &str, fallback: T, column: &'static str) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(column, value = raw, "Unrecognized column value");
        fallback
    })
}
