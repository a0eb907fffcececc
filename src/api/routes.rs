//! Application route configuration.

use axum::{middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, auth_routes, billing_routes, cart_routes, category_routes, coupon_routes,
    expense_routes, health_check, hotel_routes, inventory_routes, order_routes, product_routes,
    tenant_routes, user_routes,
};
use super::middleware::{
    rate_limit_auth_middleware, rate_limit_middleware, tenant_auth_middleware,
    tenant_billing_auth_middleware,
};
use super::openapi::ApiDoc;
use super::AppState;
use crate::errors::AppError;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Tenant-scoped routes (require a tenant JWT)
    let tenant_api = Router::new()
        .nest("/tenant", tenant_routes())
        .nest("/users", user_routes())
        .nest("/inventory", inventory_routes())
        .nest("/hotel", hotel_routes())
        .nest("/expenses", expense_routes())
        .nest("/shop/categories", category_routes())
        .nest("/shop/products", product_routes())
        .nest("/shop/coupons", coupon_routes())
        .nest("/shop/cart", cart_routes())
        .nest("/shop/orders", order_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Plan selection stays open to expired tenants
    let billing_api = Router::new()
        .nest("/tenant", billing_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_billing_auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let api = Router::new()
        .route("/", get(api_info))
        // Signup and login (stricter rate limiting)
        .nest(
            "/auth",
            auth_routes(state.clone()).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        // Platform operators
        .nest(
            "/admin",
            admin_routes(state.clone()).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            )),
        )
        .merge(tenant_api)
        .merge(billing_api);

    Router::new()
        // Health check (no rate limiting)
        .route("/health", get(health_check))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .fallback(route_not_found)
        // Global middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn api_info() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the BizHub API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::Utc;
    use sea_orm::DatabaseConnection;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::domain::TenantContext;
    use crate::infra::{Database, MockRateLimitStore};
    use crate::services::{
        AuthService, Claims, InventoryService, MockAuthService, MockInventoryService,
        MockServiceContainer, MockTenantService, TenantService,
    };
    use crate::types::Paginated;
    use policy::Role;

    fn open_rate_limits() -> MockRateLimitStore {
        let mut store = MockRateLimitStore::new();
        store
            .expect_check_rate_limit()
            .returning(|_, _, _| Ok((1, true)));
        store
    }

    fn state_with(container: MockServiceContainer) -> AppState {
        AppState::new(
            Arc::new(container),
            Arc::new(open_rate_limits()),
            Arc::new(Database::from_connection(DatabaseConnection::Disconnected)),
        )
    }

    fn staff_auth(tenant_id: Uuid) -> Arc<dyn AuthService> {
        let user_id = Uuid::new_v4();
        let mut auth = MockAuthService::new();
        auth.expect_verify_token().returning(move |token| {
            if token != "staff-token" {
                return Err(AppError::Unauthorized);
            }
            Ok(Claims {
                sub: user_id,
                tenant_id,
                email: "staff@acme.test".to_string(),
                role: Role::Staff,
                typ: "access".to_string(),
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            })
        });
        auth.expect_authenticate().returning(|claims| {
            Ok(TenantContext {
                tenant_id: claims.tenant_id,
                user_id: claims.sub,
                email: claims.email.clone(),
                role: claims.role,
            })
        });
        Arc::new(auth)
    }

    #[tokio::test]
    async fn test_tenant_context_reaches_the_service() {
        let tenant_id = Uuid::new_v4();
        let auth = staff_auth(tenant_id);

        let mut inventory = MockInventoryService::new();
        inventory
            .expect_list_products()
            .withf(move |ctx, _, page, limit| ctx.tenant_id == tenant_id && *page == 2 && *limit == 5)
            .returning(|_, _, page, limit| Ok(Paginated::new(vec![], page, limit, 7)));
        let inventory: Arc<dyn InventoryService> = Arc::new(inventory);

        let mut container = MockServiceContainer::new();
        container.expect_auth().returning(move || auth.clone());
        container.expect_inventory().returning(move || inventory.clone());

        let app = create_router(state_with(container));
        let request = Request::builder()
            .uri("/api/inventory/products?page=2&limit=5")
            .header(header::AUTHORIZATION, "Bearer staff-token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["X-RateLimit-Limit"], "100");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["pagination"]["total"], 7);
    }

    #[tokio::test]
    async fn test_rejected_token_never_reaches_the_service() {
        let auth = staff_auth(Uuid::new_v4());

        // No inventory expectation: a call would panic
        let mut container = MockServiceContainer::new();
        container.expect_auth().returning(move || auth.clone());

        let app = create_router(state_with(container));
        let request = Request::builder()
            .uri("/api/inventory/products")
            .header(header::AUTHORIZATION, "Bearer forged")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_tenant_still_reaches_plan_routes() {
        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut auth = MockAuthService::new();
        auth.expect_verify_token().returning(move |_| {
            Ok(Claims {
                sub: user_id,
                tenant_id,
                email: "owner@acme.test".to_string(),
                role: Role::Owner,
                typ: "tenant".to_string(),
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            })
        });
        auth.expect_authenticate()
            .returning(|_| Err(AppError::access_denied("Your trial has expired. Please upgrade to continue.")));
        auth.expect_authenticate_for_billing().returning(|claims| {
            Ok(TenantContext {
                tenant_id: claims.tenant_id,
                user_id: claims.sub,
                email: claims.email.clone(),
                role: claims.role,
            })
        });
        let auth: Arc<dyn AuthService> = Arc::new(auth);

        let mut tenants = MockTenantService::new();
        tenants
            .expect_available_plans()
            .times(1)
            .returning(|| Ok(vec![]));
        let tenants: Arc<dyn TenantService> = Arc::new(tenants);

        let mut container = MockServiceContainer::new();
        container.expect_auth().returning(move || auth.clone());
        container.expect_tenants().returning(move || tenants.clone());
        let app = create_router(state_with(container));

        let get = |uri: &str| {
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, "Bearer owner-token")
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(get("/api/tenant/plans")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/api/tenant")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
