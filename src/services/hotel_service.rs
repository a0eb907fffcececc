//! Hotel service - Tables and reservations.
//!
//! A table is held by its pending and confirmed reservations: no two of them
//! may fall within [`RESERVATION_BUFFER_MINUTES`] of each other, and a held
//! table cannot be deleted.

use async_trait::async_trait;
use chrono::{Duration, NaiveTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::entitlements;
use crate::config::RESERVATION_BUFFER_MINUTES;
use crate::domain::{
    CreateReservation, CreateTable, HotelStats, HotelTable, Reservation, ReservationFilter,
    ReservationStatus, TableStatus, TenantContext, UpdateReservation, UpdateTable,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::Paginated;
use crate::with_transaction;
use policy::LimitKey;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const TABLE_NUMBER_TAKEN: &str = "Table number already exists";
const TABLE_BOOKED: &str = "Table already has a reservation around this time";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HotelService: Send + Sync {
    /// Create a table, subject to the plan's `maxTables`
    async fn create_table(&self, ctx: &TenantContext, input: CreateTable) -> AppResult<HotelTable>;

    async fn list_tables(&self, ctx: &TenantContext, status: Option<TableStatus>) -> AppResult<Vec<HotelTable>>;

    async fn get_table(&self, ctx: &TenantContext, id: Uuid) -> AppResult<HotelTable>;

    async fn update_table(&self, ctx: &TenantContext, id: Uuid, input: UpdateTable) -> AppResult<HotelTable>;

    async fn delete_table(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()>;

    async fn create_reservation(&self, ctx: &TenantContext, input: CreateReservation) -> AppResult<Reservation>;

    async fn list_reservations(
        &self,
        ctx: &TenantContext,
        filter: ReservationFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Reservation>>;

    async fn get_reservation(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Reservation>;

    async fn update_reservation(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateReservation,
    ) -> AppResult<Reservation>;

    async fn cancel_reservation(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Reservation>;

    async fn stats(&self, ctx: &TenantContext) -> AppResult<HotelStats>;
}

pub struct HotelManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> HotelManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn buffer() -> Duration {
    Duration::minutes(RESERVATION_BUFFER_MINUTES)
}

#[async_trait]
impl<U: UnitOfWork> HotelService for HotelManager<U> {
    async fn create_table(&self, ctx: &TenantContext, input: CreateTable) -> AppResult<HotelTable> {
        let tenant_id = ctx.tenant_id;

        let table = with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let (tenant, plan) = entitlements::lock_tenant(repos, tenant_id).await?;
            let current = repos.tables().count(tenant_id).await?;
            entitlements::ensure_capacity(&tenant, &plan, LimitKey::MaxTables, current)?;

            if repos.tables().number_taken(tenant_id, &input.table_number, None).await? {
                return Err(AppError::conflict(TABLE_NUMBER_TAKEN));
            }
            repos.tables().create(tenant_id, input).await
        })?;

        tracing::info!(tenant_id = %tenant_id, table_id = %table.id, "Table created");
        Ok(table)
    }

    async fn list_tables(&self, ctx: &TenantContext, status: Option<TableStatus>) -> AppResult<Vec<HotelTable>> {
        self.uow.repos().tables().list(ctx.tenant_id, status).await
    }

    async fn get_table(&self, ctx: &TenantContext, id: Uuid) -> AppResult<HotelTable> {
        self.uow
            .repos()
            .tables()
            .find(ctx.tenant_id, id)
            .await?
            .ok_or_not_found("Table")
    }

    async fn update_table(&self, ctx: &TenantContext, id: Uuid, input: UpdateTable) -> AppResult<HotelTable> {
        let repos = self.uow.repos();
        if let Some(number) = input.table_number.as_deref() {
            if repos.tables().number_taken(ctx.tenant_id, number, Some(id)).await? {
                return Err(AppError::conflict(TABLE_NUMBER_TAKEN));
            }
        }
        repos.tables().update(ctx.tenant_id, id, input).await
    }

    async fn delete_table(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()> {
        let tenant_id = ctx.tenant_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            repos.tables().lock(tenant_id, id).await?;

            if repos.reservations().count_holding(tenant_id, id).await? > 0 {
                return Err(AppError::conflict("Cannot delete table with active reservations"));
            }
            repos.tables().delete(tenant_id, id).await
        })
    }

    async fn create_reservation(&self, ctx: &TenantContext, input: CreateReservation) -> AppResult<Reservation> {
        let tenant_id = ctx.tenant_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let table = repos.tables().lock(tenant_id, input.table_id).await?;

            if input.party_size > table.capacity {
                return Err(AppError::validation(format!(
                    "Party size exceeds table capacity of {}",
                    table.capacity
                )));
            }
            if repos
                .reservations()
                .has_conflict(tenant_id, table.id, input.reservation_time, buffer(), None)
                .await?
            {
                return Err(AppError::conflict(TABLE_BOOKED));
            }

            repos.reservations().create(tenant_id, input).await
        })
    }

    async fn list_reservations(
        &self,
        ctx: &TenantContext,
        filter: ReservationFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Reservation>> {
        self.uow
            .repos()
            .reservations()
            .list(ctx.tenant_id, &filter, page, limit)
            .await
    }

    async fn get_reservation(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Reservation> {
        self.uow
            .repos()
            .reservations()
            .find(ctx.tenant_id, id)
            .await?
            .ok_or_not_found("Reservation")
    }

    async fn update_reservation(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateReservation,
    ) -> AppResult<Reservation> {
        let tenant_id = ctx.tenant_id;

        with_transaction!(self.uow, |tx| {
            let repos = tx.repos();
            let current = repos
                .reservations()
                .find(tenant_id, id)
                .await?
                .ok_or_not_found("Reservation")?;

            let status = input.status.unwrap_or(current.status);
            let time = input.reservation_time.unwrap_or(current.reservation_time);

            if ReservationStatus::HOLDING.contains(&status) {
                let table = repos.tables().lock(tenant_id, current.table_id).await?;
                let party_size = input.party_size.unwrap_or(current.party_size);
                if party_size > table.capacity {
                    return Err(AppError::validation(format!(
                        "Party size exceeds table capacity of {}",
                        table.capacity
                    )));
                }
                if repos
                    .reservations()
                    .has_conflict(tenant_id, table.id, time, buffer(), Some(id))
                    .await?
                {
                    return Err(AppError::conflict(TABLE_BOOKED));
                }
            }

            repos.reservations().update(tenant_id, id, input).await
        })
    }

    async fn cancel_reservation(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Reservation> {
        let update = UpdateReservation {
            status: Some(ReservationStatus::Cancelled),
            ..Default::default()
        };
        self.uow.repos().reservations().update(ctx.tenant_id, id, update).await
    }

    async fn stats(&self, ctx: &TenantContext) -> AppResult<HotelStats> {
        let repos = self.uow.repos();
        let tables = repos.tables().list(ctx.tenant_id, None).await?;

        let today = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let today_reservations = repos
            .reservations()
            .count_between(ctx.tenant_id, today, today + Duration::days(1))
            .await?;
        let total_reservations = repos.reservations().count(ctx.tenant_id).await?;

        Ok(table_stats(&tables, total_reservations, today_reservations))
    }
}

fn table_stats(tables: &[HotelTable], total_reservations: u64, today_reservations: u64) -> HotelStats {
    let count = |status: TableStatus| tables.iter().filter(|t| t.status == status).count() as u64;
    let total_tables = tables.len() as u64;
    let occupied_tables = count(TableStatus::Occupied);

    HotelStats {
        total_tables,
        available_tables: count(TableStatus::Available),
        occupied_tables,
        reserved_tables: count(TableStatus::Reserved),
        total_reservations,
        today_reservations,
        occupancy_rate: if total_tables == 0 {
            0.0
        } else {
            occupied_tables as f64 / total_tables as f64 * 100.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(status: TableStatus) -> HotelTable {
        HotelTable {
            id: Uuid::new_v4(),
            table_number: "T1".into(),
            capacity: 4,
            location: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_occupancy_rate() {
        let stats = table_stats(
            &[
                table(TableStatus::Occupied),
                table(TableStatus::Available),
                table(TableStatus::Available),
                table(TableStatus::Reserved),
            ],
            7,
            2,
        );
        assert_eq!(stats.total_tables, 4);
        assert_eq!(stats.available_tables, 2);
        assert_eq!(stats.reserved_tables, 1);
        assert!((stats.occupancy_rate - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_tables_means_zero_occupancy() {
        assert_eq!(table_stats(&[], 0, 0).occupancy_rate, 0.0);
    }
}
