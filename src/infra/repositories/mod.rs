//! Repository layer - Data access abstraction
//!
//! Stores borrow any sea-orm connection (the pool or an open transaction), so
//! the same query code runs inside and outside a unit of work. Every store
//! method that touches tenant-owned rows takes the tenant id and filters on it.

mod admin_store;
mod cart_store;
mod catalog_store;
mod coupon_store;
pub(crate) mod entities;
mod expense_store;
mod hotel_store;
mod inventory_store;
mod order_store;
mod tenant_store;
mod user_store;

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};

use crate::errors::AppResult;
use crate::types::Paginated;

pub use admin_store::{AdminStore, AuditStore};
pub use cart_store::{CartHandle, CartLineRow, CartStore};
pub use catalog_store::{CategoryStore, ShopProductStore};
pub use coupon_store::CouponStore;
pub use expense_store::ExpenseStore;
pub use hotel_store::{ReservationStore, TableStore};
pub use inventory_store::{InventoryStore, MovementStore, NewMovement};
pub use order_store::{NewOrder, OrderStore};
pub use tenant_store::{ModuleStore, NewTenant, PlanStore, TenantStore};
pub use user_store::{NewUser, UserStore};

/// Entry point to every store over one connection.
pub struct Repos<'c, C> {
    db: &'c C,
}

impl<C> Clone for Repos<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Repos<'_, C> {}

impl<'c, C: ConnectionTrait> Repos<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub fn tenants(&self) -> TenantStore<'c, C> {
        TenantStore::new(self.db)
    }

    pub fn plans(&self) -> PlanStore<'c, C> {
        PlanStore::new(self.db)
    }

    pub fn modules(&self) -> ModuleStore<'c, C> {
        ModuleStore::new(self.db)
    }

    pub fn users(&self) -> UserStore<'c, C> {
        UserStore::new(self.db)
    }

    pub fn admins(&self) -> AdminStore<'c, C> {
        AdminStore::new(self.db)
    }

    pub fn audit(&self) -> AuditStore<'c, C> {
        AuditStore::new(self.db)
    }

    pub fn inventory(&self) -> InventoryStore<'c, C> {
        InventoryStore::new(self.db)
    }

    pub fn movements(&self) -> MovementStore<'c, C> {
        MovementStore::new(self.db)
    }

    pub fn tables(&self) -> TableStore<'c, C> {
        TableStore::new(self.db)
    }

    pub fn reservations(&self) -> ReservationStore<'c, C> {
        ReservationStore::new(self.db)
    }

    pub fn expenses(&self) -> ExpenseStore<'c, C> {
        ExpenseStore::new(self.db)
    }

    pub fn categories(&self) -> CategoryStore<'c, C> {
        CategoryStore::new(self.db)
    }

    pub fn shop_products(&self) -> ShopProductStore<'c, C> {
        ShopProductStore::new(self.db)
    }

    pub fn coupons(&self) -> CouponStore<'c, C> {
        CouponStore::new(self.db)
    }

    pub fn carts(&self) -> CartStore<'c, C> {
        CartStore::new(self.db)
    }

    pub fn orders(&self) -> OrderStore<'c, C> {
        OrderStore::new(self.db)
    }
}

/// Run `query` as one page (1-indexed) and convert rows to domain values.
async fn fetch_page<C, E, T>(db: &C, query: Select<E>, page: u64, limit: u64) -> AppResult<Paginated<T>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Sync + Into<T>,
{
    let paginator = query.paginate(db, limit);
    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(page.saturating_sub(1)).await?;

    Ok(Paginated::new(
        models.into_iter().map(Into::into).collect(),
        page,
        limit,
        total,
    ))
}

/// Case-insensitive substring match on `column`
fn contains_ci<T: IntoColumnRef>(column: T, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", term.trim().to_lowercase()))
}
