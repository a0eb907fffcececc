//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{admin_handler, auth_handler, coupon_handler, inventory_handler, user_handler};
use crate::domain::{
    AdjustStock, AdminLogin, ChangePassword, CouponValidation, CreateInventoryProduct, CreateUser,
    EnabledModule, InventoryProduct, InventoryStats, MovementType, Plan, PlatformAdmin, Profile,
    RegisterTenant, StockMovement, SuspendTenant, Tenant, TenantDetail, TenantListItem,
    TenantSummary, TenantUsage, UpdateInventoryProduct, UpdateUser, User, ValidateCoupon,
};
use crate::services::{AdminSession, AuthSession, TokenResponse};
use crate::types::PaginationMeta;

/// OpenAPI documentation for the BizHub API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BizHub API",
        version = "0.1.0",
        description = "Multi-tenant business management: inventory, hotel, expenses and e-commerce",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        auth_handler::billing_login,
        auth_handler::me,
        // Users
        user_handler::create_user,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::deactivate_user,
        user_handler::change_password,
        // Inventory
        inventory_handler::create_product,
        inventory_handler::list_products,
        inventory_handler::get_product,
        inventory_handler::update_product,
        inventory_handler::delete_product,
        inventory_handler::adjust_stock,
        inventory_handler::low_stock,
        inventory_handler::stats,
        inventory_handler::stock_history,
        // Coupons
        coupon_handler::validate_coupon,
        // Platform admin
        admin_handler::login,
        admin_handler::list_tenants,
        admin_handler::tenant_detail,
        admin_handler::suspend_tenant,
        admin_handler::activate_tenant,
        admin_handler::set_tenant_limits,
    ),
    components(
        schemas(
            // Tenants and sessions
            RegisterTenant,
            Tenant,
            TenantSummary,
            TenantUsage,
            Plan,
            EnabledModule,
            Profile,
            AuthSession,
            TokenResponse,
            auth_handler::LoginRequest,
            // Users
            User,
            CreateUser,
            UpdateUser,
            ChangePassword,
            // Inventory
            InventoryProduct,
            CreateInventoryProduct,
            UpdateInventoryProduct,
            AdjustStock,
            MovementType,
            StockMovement,
            InventoryStats,
            // Coupons
            ValidateCoupon,
            CouponValidation,
            // Admin
            AdminLogin,
            AdminSession,
            PlatformAdmin,
            SuspendTenant,
            TenantListItem,
            TenantDetail,
            admin_handler::SetTenantLimits,
            PaginationMeta,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Tenant signup, login and session"),
        (name = "Users", description = "Tenant user management"),
        (name = "Inventory", description = "Products, stock movements and stats"),
        (name = "Coupons", description = "Storefront coupon checks"),
        (name = "Admin", description = "Platform operator endpoints")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the two JWT families
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Tenant token obtained from /api/auth/login"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Admin token obtained from /api/admin/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_tenant_and_admin_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/auth/register"));
        assert!(doc.paths.paths.contains_key("/api/shop/coupons/validate"));
        assert!(doc.paths.paths.contains_key("/api/admin/tenants/{id}/suspend"));
    }
}
