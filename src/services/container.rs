//! Service Container - Centralized service access with parallel execution support.
//!
//! Handlers reach every service through [`ServiceContainer`], so tests can
//! swap in a mock container or individual mock services.

use std::future::Future;
use std::sync::Arc;

use super::{
    AdminManager, AdminService, AuthService, Authenticator, CartManager, CartService,
    CatalogManager, CatalogService, CouponManager, CouponService, ExpenseManager, ExpenseService,
    HotelManager, HotelService, InventoryManager, InventoryService, OrderManager, OrderService,
    TenantManager, TenantService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn tenants(&self) -> Arc<dyn TenantService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn inventory(&self) -> Arc<dyn InventoryService>;

    fn hotel(&self) -> Arc<dyn HotelService>;

    fn expenses(&self) -> Arc<dyn ExpenseService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn coupons(&self) -> Arc<dyn CouponService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn admin(&self) -> Arc<dyn AdminService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub tenants: Arc<dyn TenantService>,
    pub users: Arc<dyn UserService>,
    pub inventory: Arc<dyn InventoryService>,
    pub hotel: Arc<dyn HotelService>,
    pub expenses: Arc<dyn ExpenseService>,
    pub catalog: Arc<dyn CatalogService>,
    pub coupons: Arc<dyn CouponService>,
    pub carts: Arc<dyn CartService>,
    pub orders: Arc<dyn OrderService>,
    pub admin: Arc<dyn AdminService>,
}

impl Services {
    /// Wire every service over one shared unit of work
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            tenants: Arc::new(TenantManager::new(uow.clone())),
            users: Arc::new(UserManager::new(uow.clone())),
            inventory: Arc::new(InventoryManager::new(uow.clone())),
            hotel: Arc::new(HotelManager::new(uow.clone())),
            expenses: Arc::new(ExpenseManager::new(uow.clone())),
            catalog: Arc::new(CatalogManager::new(uow.clone())),
            coupons: Arc::new(CouponManager::new(uow.clone())),
            carts: Arc::new(CartManager::new(uow.clone())),
            orders: Arc::new(OrderManager::new(uow.clone())),
            admin: Arc::new(AdminManager::new(uow, config)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn tenants(&self) -> Arc<dyn TenantService> {
        self.tenants.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn inventory(&self) -> Arc<dyn InventoryService> {
        self.inventory.clone()
    }

    fn hotel(&self) -> Arc<dyn HotelService> {
        self.hotel.clone()
    }

    fn expenses(&self) -> Arc<dyn ExpenseService> {
        self.expenses.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    fn coupons(&self) -> Arc<dyn CouponService> {
        self.coupons.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.carts.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.orders.clone()
    }

    fn admin(&self) -> Arc<dyn AdminService> {
        self.admin.clone()
    }
}

/// Run independent reads concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute three independent async operations in parallel.
    pub async fn join3<F1, F2, F3, T1, T2, T3>(f1: F1, f2: F2, f3: F3) -> AppResult<(T1, T2, T3)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
    {
        try_join!(f1, f2, f3)
    }

    /// Results come back in input order.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        futures::future::join_all(futures).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<i32> {
            Ok(2)
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!((a, b), (1, 2));
    }

    #[tokio::test]
    async fn test_parallel_join_all_keeps_order() {
        let futures: Vec<_> = (0..5).map(|i| async move { Ok(i) as AppResult<i32> }).collect();
        let results = parallel::join_all(futures).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_parallel_join3_fails_fast() {
        let result = parallel::join3(
            async { Ok::<_, AppError>(1) },
            async { Err::<i32, _>(AppError::Forbidden) },
            async { Ok::<_, AppError>(3) },
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[test]
    fn test_mock_container_hands_out_services() {
        use crate::services::MockCouponService;

        let mut container = MockServiceContainer::new();
        container
            .expect_coupons()
            .returning(|| Arc::new(MockCouponService::new()));
        let _coupons = container.coupons();
    }
}
