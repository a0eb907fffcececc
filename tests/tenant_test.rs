//! Tenant lifecycle against a real database: signup, isolation, plan
//! limits and platform suspension.

mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use bizhub::config::MODULES;
use bizhub::domain::{AuditFilter, CreateUser, TenantFilter};
use bizhub::errors::AppError;
use bizhub::infra::{Persistence, UnitOfWork};
use bizhub::services::ServiceContainer;
use common::{inventory_item, registration, TestApp, OWNER_PASSWORD};
use policy::{Limit, LimitKey, LimitSet, Role, TenantStatus};

#[tokio::test]
async fn test_register_starts_trial_with_owner_and_modules() {
    let app = TestApp::new().await;
    let (session, ctx) = app.owner("acme").await;

    assert_eq!(session.tenant.slug, "acme");
    assert_eq!(session.tenant.status, TenantStatus::Trial);
    assert_eq!(session.tenant.plan, "Free Trial");
    assert_eq!(session.user.role, Role::Owner);
    assert_eq!(session.token.token_type, "Bearer");

    let overview = app.services.tenants().overview(&ctx).await.unwrap();
    let trial_end = overview.tenant.trial_end_date.expect("trial end date");
    let expected = Utc::now() + Duration::days(60);
    assert!((trial_end - expected).num_minutes().abs() < 5);
    assert_eq!(overview.usage.users, 1);

    let profile = app.services.auth().profile(&ctx).await.unwrap();
    assert_eq!(profile.modules.len(), MODULES.len());
}

#[tokio::test]
async fn test_register_rejects_taken_slug_and_email() {
    let app = TestApp::new().await;
    app.register("acme").await;

    let mut same_slug = registration("acme");
    same_slug.email = "someone@else.test".to_string();
    let result = app.services.auth().register(same_slug).await;
    assert!(matches!(result, Err(AppError::Conflict(msg)) if msg == "Slug is already taken"));

    let mut same_email = registration("globex");
    same_email.email = "owner@acme.test".to_string();
    let result = app.services.auth().register(same_email).await;
    assert!(matches!(result, Err(AppError::Conflict(msg)) if msg == "Email is already registered"));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = TestApp::new().await;
    app.register("acme").await;

    let result = app
        .services
        .auth()
        .login("owner@acme.test".to_string(), "not-the-password".to_string())
        .await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));

    let session = app
        .services
        .auth()
        .login("OWNER@acme.test".to_string(), OWNER_PASSWORD.to_string())
        .await
        .unwrap();
    assert_eq!(session.tenant.slug, "acme");
}

#[tokio::test]
async fn test_records_are_invisible_to_other_tenants() {
    let app = TestApp::new().await;
    let (_, acme) = app.owner("acme").await;
    let (_, globex) = app.owner("globex").await;

    let product = app
        .services
        .inventory()
        .create_product(&acme, inventory_item("Anvil"))
        .await
        .unwrap();

    let result = app.services.inventory().get_product(&globex, product.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = app.services.inventory().delete_product(&globex, product.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let listed = app
        .services
        .inventory()
        .list_products(&globex, Default::default(), 1, 20)
        .await
        .unwrap();
    assert!(listed.data.is_empty());

    let still_there = app.services.inventory().get_product(&acme, product.id).await;
    assert!(still_there.is_ok());
}

#[tokio::test]
async fn test_product_limit_blocks_creation_past_the_plan() {
    let app = TestApp::new().await;
    let (_, ctx) = app.owner("acme").await;
    app.upgrade(&ctx, "basic").await;

    for i in 0..100 {
        app.services
            .inventory()
            .create_product(&ctx, inventory_item(&format!("Item {}", i)))
            .await
            .unwrap();
    }

    let result = app
        .services
        .inventory()
        .create_product(&ctx, inventory_item("One too many"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(msg)) if msg.contains("limit reached")));

    let overview = app.services.tenants().overview(&ctx).await.unwrap();
    assert_eq!(overview.usage.products, 100);
}

#[tokio::test]
async fn test_custom_limits_override_the_plan() {
    let app = TestApp::new().await;
    let (session, ctx) = app.owner("acme").await;
    let admin = app.admin().await;

    let limits = LimitSet {
        max_products: Some(Limit::Bounded(1)),
        ..Default::default()
    };
    app.services
        .admin()
        .set_tenant_limits(&admin, session.tenant.id, limits)
        .await
        .unwrap();

    app.services
        .inventory()
        .create_product(&ctx, inventory_item("Only one"))
        .await
        .unwrap();
    let result = app
        .services
        .inventory()
        .create_product(&ctx, inventory_item("Second"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // Limits the override leaves out still come from the plan
    let overview = app.services.tenants().overview(&ctx).await.unwrap();
    assert_eq!(overview.limits.get(LimitKey::MaxProducts), Some(Limit::Bounded(1)));
    assert_eq!(overview.limits.get(LimitKey::MaxUsers), Some(Limit::Bounded(2)));
}

#[tokio::test]
async fn test_user_limit_and_role_checks() {
    let app = TestApp::new().await;
    let (_, owner) = app.owner("acme").await;

    let staff_input = |email: &str| CreateUser {
        email: email.to_string(),
        password: "staff-password-1".to_string(),
        role: Role::Staff,
        first_name: None,
        last_name: None,
    };

    app.services
        .users()
        .create_user(&owner, staff_input("staff@acme.test"))
        .await
        .unwrap();

    // Trial allows two users: the owner and one more
    let result = app
        .services
        .users()
        .create_user(&owner, staff_input("extra@acme.test"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let staff_session = app
        .services
        .auth()
        .login("staff@acme.test".to_string(), "staff-password-1".to_string())
        .await
        .unwrap();
    let staff = app.tenant_context(&staff_session.token.access_token).await;
    assert_eq!(staff.role, Role::Staff);

    let result = app.services.tenants().upgrade(&staff, Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let result = app
        .services
        .users()
        .create_user(&staff, staff_input("sneaky@acme.test"))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_suspension_is_audited_and_blocks_login() {
    let app = TestApp::new().await;
    let (session, ctx) = app.owner("acme").await;
    let admin = app.admin().await;
    let tenant_id = session.tenant.id;

    let tenant = app
        .services
        .admin()
        .suspend_tenant(&admin, tenant_id, "non-payment".to_string())
        .await
        .unwrap();
    assert_eq!(tenant.status, TenantStatus::Suspended);

    let filter = AuditFilter {
        target_type: None,
        action: Some("suspend_tenant".to_string()),
    };
    let logs = app.services.admin().audit_logs(filter, 1, 20).await.unwrap();
    assert_eq!(logs.data.len(), 1);
    let entry = &logs.data[0];
    assert_eq!(entry.admin_id, admin.admin_id);
    assert_eq!(entry.target_id, Some(tenant_id));
    assert_eq!(
        entry.details.as_ref().and_then(|d| d["reason"].as_str()),
        Some("non-payment")
    );

    let login = app
        .services
        .auth()
        .login("owner@acme.test".to_string(), OWNER_PASSWORD.to_string())
        .await;
    assert!(matches!(login, Err(AppError::AccessDenied(msg)) if msg.contains("suspended")));

    // Tokens issued before the suspension stop working too
    let claims = app.services.auth().verify_token(&session.token.access_token).unwrap();
    let result = app.services.auth().authenticate(&claims).await;
    assert!(matches!(result, Err(AppError::AccessDenied(_))));

    // Suspended tenants cannot buy their way out
    let plans = app.services.tenants().available_plans().await.unwrap();
    let basic = plans.iter().find(|p| p.name == "basic").unwrap();
    let result = app.services.tenants().upgrade(&ctx, basic.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let tenant = app.services.admin().activate_tenant(&admin, tenant_id).await.unwrap();
    assert_eq!(tenant.status, TenantStatus::Active);
    assert!(app
        .services
        .auth()
        .login("owner@acme.test".to_string(), OWNER_PASSWORD.to_string())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_only_suspended_tenants_can_be_activated() {
    let app = TestApp::new().await;
    let (session, _) = app.owner("acme").await;
    let admin = app.admin().await;

    let result = app.services.admin().activate_tenant(&admin, session.tenant.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_overdue_trial_expires_at_login() {
    let app = TestApp::new().await;
    let (session, ctx) = app.owner("acme").await;
    app.backdate_trial(session.tenant.id).await;

    let login = app
        .services
        .auth()
        .login("owner@acme.test".to_string(), OWNER_PASSWORD.to_string())
        .await;
    assert!(matches!(login, Err(AppError::AccessDenied(msg)) if msg.contains("trial has expired")));

    let overview = app.services.tenants().overview(&ctx).await.unwrap();
    assert_eq!(overview.tenant.status, TenantStatus::Expired);

    let claims = app.services.auth().verify_token(&session.token.access_token).unwrap();
    let result = app.services.auth().authenticate(&claims).await;
    assert!(matches!(result, Err(AppError::AccessDenied(_))));
}

#[tokio::test]
async fn test_expired_owner_upgrades_back_in() {
    let app = TestApp::new().await;
    let (session, _) = app.owner("acme").await;
    app.backdate_trial(session.tenant.id).await;
    let auth = app.services.auth();

    let login = auth
        .login("owner@acme.test".to_string(), OWNER_PASSWORD.to_string())
        .await;
    assert!(login.is_err());

    let billing = auth
        .billing_login("owner@acme.test".to_string(), OWNER_PASSWORD.to_string())
        .await
        .unwrap();
    assert_eq!(billing.tenant.status, TenantStatus::Expired);

    let claims = auth.verify_token(&billing.token.access_token).unwrap();
    let ctx = auth.authenticate_for_billing(&claims).await.unwrap();
    app.upgrade(&ctx, "basic").await;

    let session = auth
        .login("owner@acme.test".to_string(), OWNER_PASSWORD.to_string())
        .await
        .unwrap();
    assert_eq!(session.tenant.status, TenantStatus::Active);
    assert!(auth.authenticate(&claims).await.is_ok());
}

#[tokio::test]
async fn test_trial_expiry_never_overwrites_a_suspension() {
    let app = TestApp::new().await;
    let (session, _) = app.owner("acme").await;
    let admin = app.admin().await;
    let tenant_id = session.tenant.id;

    app.services
        .admin()
        .suspend_tenant(&admin, tenant_id, "chargeback".to_string())
        .await
        .unwrap();
    app.backdate_trial(tenant_id).await;

    let persistence = Persistence::new(app.db.clone());
    assert!(!persistence.repos().tenants().expire_trial(tenant_id).await.unwrap());

    let login = app
        .services
        .auth()
        .billing_login("owner@acme.test".to_string(), OWNER_PASSWORD.to_string())
        .await;
    assert!(matches!(login, Err(AppError::AccessDenied(msg)) if msg.contains("suspended")));

    let tenant = persistence.repos().tenants().find_by_id(tenant_id).await.unwrap().unwrap();
    assert_eq!(tenant.status, TenantStatus::Suspended);
}

#[tokio::test]
async fn test_admin_tenant_list_counts_users() {
    let app = TestApp::new().await;
    let (_, acme) = app.owner("acme").await;
    app.owner("globex").await;

    app.services
        .users()
        .create_user(
            &acme,
            CreateUser {
                email: "staff@acme.test".to_string(),
                password: "staff-password-1".to_string(),
                role: Role::Staff,
                first_name: None,
                last_name: None,
            },
        )
        .await
        .unwrap();

    let page = app
        .services
        .admin()
        .list_tenants(TenantFilter::default(), 1, 20)
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);

    let counts: Vec<(String, u64)> = page
        .data
        .iter()
        .map(|item| (item.tenant.slug.clone(), item.user_count))
        .collect();
    assert!(counts.contains(&("acme".to_string(), 2)));
    assert!(counts.contains(&("globex".to_string(), 1)));
    assert!(page.data.iter().all(|item| item.plan_name == "Free Trial"));
}
