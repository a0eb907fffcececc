//! Domain layer - Core business entities and request/response shapes
//!
//! Types here are independent of storage. Pure rules (limits, roles, tenant
//! status, coupons) live in the `policy` crate and are re-exported where the
//! API needs them.

pub mod admin;
pub mod context;
pub mod expense;
pub mod hotel;
pub mod inventory;
pub mod shop;
pub mod tenant;
pub mod user;

pub use admin::{
    AdminLogin, AuditEntry, AuditFilter, GrowthPoint, NewAuditEntry, PlanShare, PlatformAdmin,
    PlatformOverview, SuspendTenant, TenantDetail, TenantFilter, TenantListItem,
};
pub use context::{AdminContext, TenantContext};
pub use expense::{
    CategoryTotal, CreateExpense, Expense, ExpenseFilter, ExpenseSummary, MonthlyTotal,
    UpdateExpense,
};
pub use hotel::{
    CreateReservation, CreateTable, HotelStats, HotelTable, Reservation, ReservationFilter,
    ReservationStatus, TableStatus, UpdateReservation, UpdateTable,
};
pub use inventory::{
    AdjustStock, CategoryCount, CreateInventoryProduct, InventoryFilter, InventoryProduct,
    InventoryStats, MovementType, StockMovement, UpdateInventoryProduct,
};
pub use shop::{
    AddCartItem, CartLine, CartView, Category, CategoryNode, CategoryPosition, Checkout, Coupon,
    CouponValidation, CreateCategory, CreateCoupon, CreateShopProduct, Order, OrderFilter,
    OrderItem, OrderStatus, ReorderCategories, SalesFilter, SalesSummary, SetStock, ShopProduct,
    ShopProductFilter, TopProduct, UpdateCartItem, UpdateCategory, UpdateCoupon,
    UpdateOrderStatus, UpdateShopProduct, ValidateCoupon,
};
pub use tenant::{
    CreatePlan, EnabledModule, Plan, PlanSummary, RegisterTenant, Tenant, TenantOverview,
    TenantSummary, TenantUsage, UpdatePlan, UpdateTenant, UpgradePlan,
};
pub use user::{ChangePassword, CreateUser, Profile, UpdateUser, User};
