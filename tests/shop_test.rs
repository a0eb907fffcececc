//! Storefront and hotel flows against a real database: coupons, checkout,
//! cancellation and the guards on deleting referenced records.

mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use bizhub::domain::{
    AddCartItem, Checkout, CreateCategory, CreateCoupon, CreateReservation, CreateShopProduct,
    CreateTable, OrderStatus, ShopProduct, TenantContext, ValidateCoupon,
};
use bizhub::errors::AppError;
use bizhub::infra::{Persistence, UnitOfWork};
use bizhub::services::{CouponRemoval, ServiceContainer};
use common::{inventory_item, TestApp};
use policy::DiscountType;

fn shop_product(name: &str, price: i64, stock: i32, category_id: Option<Uuid>) -> CreateShopProduct {
    CreateShopProduct {
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        category_id,
        description: None,
        price: Decimal::from(price),
        compare_at_price: None,
        sku: None,
        stock,
        low_stock_threshold: None,
        is_active: Some(true),
        is_featured: None,
    }
}

fn save10(max_uses: Option<i32>) -> CreateCoupon {
    CreateCoupon {
        code: "SAVE10".to_string(),
        description: None,
        discount_type: DiscountType::Percentage,
        discount_value: Decimal::from(10),
        min_order_amount: Some(Decimal::from(50)),
        max_uses,
        starts_at: None,
        expires_at: None,
        is_active: Some(true),
    }
}

fn checkout(coupon: Option<&str>) -> Checkout {
    Checkout {
        shipping_address: json!({ "line1": "1 Market St", "city": "Springfield" }),
        billing_address: None,
        coupon_code: coupon.map(str::to_string),
        notes: None,
    }
}

async fn fill_cart(app: &TestApp, ctx: &TenantContext, product: &ShopProduct, quantity: i32) {
    app.services
        .carts()
        .add_item(
            ctx,
            AddCartItem {
                product_id: product.id,
                quantity,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_coupon_validation_respects_minimum_order() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    app.services.coupons().create_coupon(&ctx, save10(None)).await.unwrap();

    let too_small = app
        .services
        .coupons()
        .validate_coupon(
            &ctx,
            ValidateCoupon {
                code: "SAVE10".to_string(),
                order_total: Decimal::from(40),
            },
        )
        .await
        .unwrap();
    assert!(!too_small.valid);
    assert!(too_small.error.unwrap().starts_with("Minimum order amount"));

    let accepted = app
        .services
        .coupons()
        .validate_coupon(
            &ctx,
            ValidateCoupon {
                code: "SAVE10".to_string(),
                order_total: Decimal::from(100),
            },
        )
        .await
        .unwrap();
    assert!(accepted.valid);
    assert_eq!(accepted.discount_amount, Some(Decimal::from(10)));

    let unknown = app
        .services
        .coupons()
        .validate_coupon(
            &ctx,
            ValidateCoupon {
                code: "NOPE".to_string(),
                order_total: Decimal::from(100),
            },
        )
        .await
        .unwrap();
    assert_eq!(unknown.error.as_deref(), Some("Coupon not found"));
}

#[tokio::test]
async fn test_coupon_codes_are_scoped_per_tenant() {
    let app = TestApp::new().await;
    let (_, acme) = app.owner("acme").await;
    let (_, globex) = app.owner("globex").await;

    app.services.coupons().create_coupon(&acme, save10(None)).await.unwrap();
    app.services.coupons().create_coupon(&globex, save10(None)).await.unwrap();

    let result = app.services.coupons().create_coupon(&acme, save10(None)).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_checkout_applies_coupon_and_takes_stock() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let product = app
        .services
        .catalog()
        .create_product(&ctx, shop_product("Lamp", 25, 10, None))
        .await
        .unwrap();
    let coupon = app.services.coupons().create_coupon(&ctx, save10(Some(5))).await.unwrap();

    fill_cart(&app, &ctx, &product, 4).await;
    let order = app.services.orders().checkout(&ctx, checkout(Some("SAVE10"))).await.unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.subtotal, Decimal::from(100));
    assert_eq!(order.discount_amount, Decimal::from(10));
    assert_eq!(order.total, Decimal::from(90));
    assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.billing_address, order.shipping_address);

    let product = app.services.catalog().get_product(&ctx, product.id).await.unwrap();
    assert_eq!(product.stock, 6);
    let coupon = app.services.coupons().get_coupon(&ctx, coupon.id).await.unwrap();
    assert_eq!(coupon.used_count, 1);

    let cart = app.services.carts().get_cart(&ctx).await.unwrap();
    assert!(cart.items.is_empty());

    let mine = app.services.orders().my_orders(&ctx, 1, 10).await.unwrap();
    assert_eq!(mine.data.len(), 1);
}

#[tokio::test]
async fn test_checkout_is_all_or_nothing() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let product = app
        .services
        .catalog()
        .create_product(&ctx, shop_product("Lamp", 25, 10, None))
        .await
        .unwrap();
    let coupon = app.services.coupons().create_coupon(&ctx, save10(None)).await.unwrap();

    fill_cart(&app, &ctx, &product, 4).await;
    // Stock drops below the cart quantity before the customer checks out
    app.services.catalog().set_stock(&ctx, product.id, 2).await.unwrap();

    let result = app.services.orders().checkout(&ctx, checkout(Some("SAVE10"))).await;
    assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("Insufficient stock")));

    let product = app.services.catalog().get_product(&ctx, product.id).await.unwrap();
    assert_eq!(product.stock, 2);
    let coupon = app.services.coupons().get_coupon(&ctx, coupon.id).await.unwrap();
    assert_eq!(coupon.used_count, 0);
    let cart = app.services.carts().get_cart(&ctx).await.unwrap();
    assert_eq!(cart.items.len(), 1);
}

#[tokio::test]
async fn test_coupon_usage_limit_is_enforced_at_checkout() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let product = app
        .services
        .catalog()
        .create_product(&ctx, shop_product("Lamp", 25, 20, None))
        .await
        .unwrap();
    app.services.coupons().create_coupon(&ctx, save10(Some(1))).await.unwrap();

    fill_cart(&app, &ctx, &product, 4).await;
    app.services.orders().checkout(&ctx, checkout(Some("SAVE10"))).await.unwrap();

    fill_cart(&app, &ctx, &product, 4).await;
    let result = app.services.orders().checkout(&ctx, checkout(Some("SAVE10"))).await;
    assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Coupon usage limit reached"));

    let product = app.services.catalog().get_product(&ctx, product.id).await.unwrap();
    assert_eq!(product.stock, 16);
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;

    let result = app.services.orders().checkout(&ctx, checkout(None)).await;
    assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Cart is empty"));
}

#[tokio::test]
async fn test_cancel_restores_stock_once() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let product = app
        .services
        .catalog()
        .create_product(&ctx, shop_product("Lamp", 25, 10, None))
        .await
        .unwrap();

    fill_cart(&app, &ctx, &product, 3).await;
    let order = app.services.orders().checkout(&ctx, checkout(None)).await.unwrap();

    // Cancelling through a status change takes the same path
    let cancelled = app
        .services
        .orders()
        .update_status(&ctx, order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let product = app.services.catalog().get_product(&ctx, product.id).await.unwrap();
    assert_eq!(product.stock, 10);

    let again = app.services.orders().cancel_order(&ctx, order.id).await;
    assert!(matches!(again, Err(AppError::Validation(_))));
    let product = app.services.catalog().get_product(&ctx, product.id).await.unwrap();
    assert_eq!(product.stock, 10);
}

#[tokio::test]
async fn test_store_and_inventory_share_the_product_quota() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;

    // Trial allows 50 products in total
    for i in 0..50 {
        app.services
            .inventory()
            .create_product(&ctx, inventory_item(&format!("Item {}", i)))
            .await
            .unwrap();
    }

    let result = app
        .services
        .catalog()
        .create_product(&ctx, shop_product("Lamp", 25, 1, None))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_referenced_records_are_not_deleted() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let catalog = app.services.catalog();

    let parent = catalog
        .create_category(
            &ctx,
            CreateCategory {
                name: "Lighting".to_string(),
                slug: "lighting".to_string(),
                parent_id: None,
                description: None,
                sort_order: 0,
            },
        )
        .await
        .unwrap();
    let child = catalog
        .create_category(
            &ctx,
            CreateCategory {
                name: "Desk lamps".to_string(),
                slug: "desk-lamps".to_string(),
                parent_id: Some(parent.id),
                description: None,
                sort_order: 0,
            },
        )
        .await
        .unwrap();
    let product = catalog
        .create_product(&ctx, shop_product("Lamp", 25, 10, Some(child.id)))
        .await
        .unwrap();

    let result = catalog.delete_category(&ctx, parent.id).await;
    assert!(matches!(result, Err(AppError::Conflict(msg)) if msg.contains("subcategories")));
    let result = catalog.delete_category(&ctx, child.id).await;
    assert!(matches!(result, Err(AppError::Conflict(msg)) if msg.contains("products")));

    catalog.delete_product(&ctx, product.id).await.unwrap();
    catalog.delete_category(&ctx, child.id).await.unwrap();
    catalog.delete_category(&ctx, parent.id).await.unwrap();
}

#[tokio::test]
async fn test_used_coupons_are_deactivated_instead_of_deleted() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let product = app
        .services
        .catalog()
        .create_product(&ctx, shop_product("Lamp", 25, 10, None))
        .await
        .unwrap();
    let used = app.services.coupons().create_coupon(&ctx, save10(None)).await.unwrap();
    let mut spare_input = save10(None);
    spare_input.code = "SPARE".to_string();
    let spare = app.services.coupons().create_coupon(&ctx, spare_input).await.unwrap();

    fill_cart(&app, &ctx, &product, 4).await;
    app.services.orders().checkout(&ctx, checkout(Some("SAVE10"))).await.unwrap();

    let removal = app.services.coupons().delete_coupon(&ctx, used.id).await.unwrap();
    assert_eq!(removal, CouponRemoval::Deactivated);
    let used = app.services.coupons().get_coupon(&ctx, used.id).await.unwrap();
    assert!(!used.is_active);

    let removal = app.services.coupons().delete_coupon(&ctx, spare.id).await.unwrap();
    assert_eq!(removal, CouponRemoval::Deleted);
    let result = app.services.coupons().get_coupon(&ctx, spare.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_tables_with_reservations_are_kept() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let hotel = app.services.hotel();

    let table = hotel
        .create_table(
            &ctx,
            CreateTable {
                table_number: "T1".to_string(),
                capacity: 4,
                location: None,
            },
        )
        .await
        .unwrap();

    let booking = |party_size: i32| CreateReservation {
        table_id: table.id,
        customer_name: "Grace".to_string(),
        customer_phone: None,
        customer_email: None,
        party_size,
        reservation_time: Utc::now() + Duration::days(1),
        notes: None,
    };

    let result = hotel.create_reservation(&ctx, booking(6)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let reservation = hotel.create_reservation(&ctx, booking(2)).await.unwrap();
    let result = hotel.create_reservation(&ctx, booking(2)).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let result = hotel.delete_table(&ctx, table.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    hotel.cancel_reservation(&ctx, reservation.id).await.unwrap();
    hotel.delete_table(&ctx, table.id).await.unwrap();
}

#[tokio::test]
async fn test_parents_from_another_tenant_are_not_found() {
    let app = TestApp::new().await;
    let (_, acme) = app.owner("acme").await;
    let (_, globex) = app.owner("globex").await;

    let foreign = app
        .services
        .catalog()
        .create_category(
            &globex,
            CreateCategory {
                name: "Tools".to_string(),
                slug: "tools".to_string(),
                parent_id: None,
                description: None,
                sort_order: 0,
            },
        )
        .await
        .unwrap();

    let result = app
        .services
        .catalog()
        .create_category(
            &acme,
            CreateCategory {
                name: "Hammers".to_string(),
                slug: "hammers".to_string(),
                parent_id: Some(foreign.id),
                description: None,
                sort_order: 0,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = app
        .services
        .catalog()
        .create_product(&acme, shop_product("Hammer", 15, 3, Some(foreign.id)))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

fn table(number: &str) -> CreateTable {
    CreateTable {
        table_number: number.to_string(),
        capacity: 4,
        location: None,
    }
}

#[tokio::test]
async fn test_table_limit_blocks_creation_past_the_plan() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let hotel = app.services.hotel();

    // Trial allows five tables
    for i in 1..=5 {
        hotel.create_table(&ctx, table(&format!("T{}", i))).await.unwrap();
    }

    let result = hotel.create_table(&ctx, table("T6")).await;
    assert!(matches!(result, Err(AppError::Conflict(msg)) if msg.contains("limit reached")));

    assert_eq!(hotel.list_tables(&ctx, None).await.unwrap().len(), 5);
    let overview = app.services.tenants().overview(&ctx).await.unwrap();
    assert_eq!(overview.usage.tables, 5);
}

#[tokio::test]
async fn test_reservations_within_an_hour_conflict() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let hotel = app.services.hotel();
    let t1 = hotel.create_table(&ctx, table("T1")).await.unwrap();
    let t2 = hotel.create_table(&ctx, table("T2")).await.unwrap();

    let dinner = Utc::now() + Duration::days(2);
    let booking = |table_id: Uuid, at| CreateReservation {
        table_id,
        customer_name: "Grace".to_string(),
        customer_phone: None,
        customer_email: None,
        party_size: 2,
        reservation_time: at,
        notes: None,
    };

    let first = hotel.create_reservation(&ctx, booking(t1.id, dinner)).await.unwrap();

    for offset in [-59, 59] {
        let result = hotel
            .create_reservation(&ctx, booking(t1.id, dinner + Duration::minutes(offset)))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))), "offset {} minutes", offset);
    }

    // Outside the window, or at another table, is fine
    hotel
        .create_reservation(&ctx, booking(t1.id, dinner + Duration::minutes(61)))
        .await
        .unwrap();
    hotel.create_reservation(&ctx, booking(t2.id, dinner)).await.unwrap();

    // A cancelled reservation frees its slot
    hotel.cancel_reservation(&ctx, first.id).await.unwrap();
    hotel
        .create_reservation(&ctx, booking(t1.id, dinner - Duration::minutes(30)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_status_changes_only_apply_once() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    let product = app
        .services
        .catalog()
        .create_product(&ctx, shop_product("Lamp", 25, 10, None))
        .await
        .unwrap();
    fill_cart(&app, &ctx, &product, 3).await;
    let order = app.services.orders().checkout(&ctx, checkout(None)).await.unwrap();

    let persistence = Persistence::new(app.db.clone());
    let repos = persistence.repos();

    // Another writer cancels first: the service must not restore stock again
    let cancelled = repos
        .orders()
        .transition(ctx.tenant_id, order.id, OrderStatus::CANCELLABLE, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert!(cancelled.is_some_and(|o| o.cancelled_at.is_some()));
    let again = repos
        .orders()
        .transition(ctx.tenant_id, order.id, OrderStatus::CANCELLABLE, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert!(again.is_none());

    let result = app.services.orders().cancel_order(&ctx, order.id).await;
    assert!(result.is_err());
    let product = app.services.catalog().get_product(&ctx, product.id).await.unwrap();
    assert_eq!(product.stock, 7);

    // A cart can only be converted by one checkout
    let carts = repos.carts();
    let cart = carts.open(ctx.tenant_id, ctx.user_id).await.unwrap();
    assert!(carts.mark_converted(&cart).await.unwrap());
    assert!(!carts.mark_converted(&cart).await.unwrap());
}
