//! Hotel tables and reservations.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::{hotel_table as table, reservation};
use super::fetch_page;
use crate::domain::{
    CreateReservation, CreateTable, HotelTable, Reservation, ReservationFilter, ReservationStatus,
    TableStatus, UpdateReservation, UpdateTable,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::Paginated;

pub struct TableStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> TableStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<HotelTable>> {
        let model = table::Entity::find_by_id(id)
            .filter(table::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;
        Ok(model.map(HotelTable::from))
    }

    /// Load and lock a table for the rest of the transaction. Serializes
    /// bookings on the same table.
    pub async fn lock(&self, tenant_id: Uuid, id: Uuid) -> AppResult<HotelTable> {
        table::Entity::find_by_id(id)
            .filter(table::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(self.db)
            .await?
            .map(HotelTable::from)
            .ok_or_not_found("Table")
    }

    pub async fn number_taken(&self, tenant_id: Uuid, number: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = table::Entity::find()
            .filter(table::Column::TenantId.eq(tenant_id))
            .filter(table::Column::TableNumber.eq(number));
        if let Some(id) = except {
            query = query.filter(table::Column::Id.ne(id));
        }
        Ok(query.count(self.db).await? > 0)
    }

    pub async fn create(&self, tenant_id: Uuid, input: CreateTable) -> AppResult<HotelTable> {
        let now = Utc::now();
        let model = table::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            table_number: Set(input.table_number),
            capacity: Set(input.capacity),
            location: Set(input.location),
            status: Set(TableStatus::Available.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(HotelTable::from(model))
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateTable) -> AppResult<HotelTable> {
        let model = table::Entity::find_by_id(id)
            .filter(table::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .ok_or_not_found("Table")?;

        let mut active: table::ActiveModel = model.into();
        if let Some(number) = input.table_number {
            active.table_number = Set(number);
        }
        if let Some(capacity) = input.capacity {
            active.capacity = Set(capacity);
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(status) = input.status {
            active.status = Set(status.as_str().to_string());
        }
        active.updated_at = Set(Utc::now());

        Ok(HotelTable::from(active.update(self.db).await?))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = table::Entity::delete_many()
            .filter(table::Column::Id.eq(id))
            .filter(table::Column::TenantId.eq(tenant_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Table"));
        }
        Ok(())
    }

    pub async fn list(&self, tenant_id: Uuid, status: Option<TableStatus>) -> AppResult<Vec<HotelTable>> {
        let mut query = table::Entity::find()
            .filter(table::Column::TenantId.eq(tenant_id))
            .order_by_asc(table::Column::TableNumber);
        if let Some(status) = status {
            query = query.filter(table::Column::Status.eq(status.as_str()));
        }
        let models = query.all(self.db).await?;
        Ok(models.into_iter().map(HotelTable::from).collect())
    }

    /// Counted against `maxTables`
    pub async fn count(&self, tenant_id: Uuid) -> AppResult<u64> {
        Ok(table::Entity::find()
            .filter(table::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await?)
    }
}

pub struct ReservationStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> ReservationStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Reservation>> {
        let model = reservation::Entity::find_by_id(id)
            .filter(reservation::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;
        Ok(model.map(Reservation::from))
    }

    pub async fn create(&self, tenant_id: Uuid, input: CreateReservation) -> AppResult<Reservation> {
        let now = Utc::now();
        let model = reservation::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            table_id: Set(input.table_id),
            customer_name: Set(input.customer_name),
            customer_phone: Set(input.customer_phone),
            customer_email: Set(input.customer_email),
            party_size: Set(input.party_size),
            reservation_time: Set(input.reservation_time),
            status: Set(ReservationStatus::Pending.as_str().to_string()),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(Reservation::from(model))
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateReservation,
    ) -> AppResult<Reservation> {
        let model = reservation::Entity::find_by_id(id)
            .filter(reservation::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .ok_or_not_found("Reservation")?;

        let mut active: reservation::ActiveModel = model.into();
        if let Some(name) = input.customer_name {
            active.customer_name = Set(name);
        }
        if let Some(phone) = input.customer_phone {
            active.customer_phone = Set(Some(phone));
        }
        if let Some(email) = input.customer_email {
            active.customer_email = Set(Some(email));
        }
        if let Some(party_size) = input.party_size {
            active.party_size = Set(party_size);
        }
        if let Some(time) = input.reservation_time {
            active.reservation_time = Set(time);
        }
        if let Some(status) = input.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        Ok(Reservation::from(active.update(self.db).await?))
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &ReservationFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Reservation>> {
        let mut query = reservation::Entity::find()
            .filter(reservation::Column::TenantId.eq(tenant_id))
            .order_by_asc(reservation::Column::ReservationTime);

        if let Some(status) = filter.status {
            query = query.filter(reservation::Column::Status.eq(status.as_str()));
        }
        if let Some(table_id) = filter.table_id {
            query = query.filter(reservation::Column::TableId.eq(table_id));
        }
        if let Some(date) = filter.date {
            let start = date.and_time(NaiveTime::MIN).and_utc();
            query = query
                .filter(reservation::Column::ReservationTime.gte(start))
                .filter(reservation::Column::ReservationTime.lt(start + Duration::days(1)));
        }

        fetch_page(self.db, query, page, limit).await
    }

    /// Whether a pending or confirmed reservation on `table_id` falls within
    /// `buffer` of `at`.
    pub async fn has_conflict(
        &self,
        tenant_id: Uuid,
        table_id: Uuid,
        at: DateTime<Utc>,
        buffer: Duration,
        except: Option<Uuid>,
    ) -> AppResult<bool> {
        let mut query = reservation::Entity::find()
            .filter(reservation::Column::TenantId.eq(tenant_id))
            .filter(reservation::Column::TableId.eq(table_id))
            .filter(reservation::Column::Status.is_in(holding_statuses()))
            .filter(reservation::Column::ReservationTime.gte(at - buffer))
            .filter(reservation::Column::ReservationTime.lte(at + buffer));
        if let Some(id) = except {
            query = query.filter(reservation::Column::Id.ne(id));
        }
        Ok(query.count(self.db).await? > 0)
    }

    /// Pending or confirmed reservations on a table
    pub async fn count_holding(&self, tenant_id: Uuid, table_id: Uuid) -> AppResult<u64> {
        Ok(reservation::Entity::find()
            .filter(reservation::Column::TenantId.eq(tenant_id))
            .filter(reservation::Column::TableId.eq(table_id))
            .filter(reservation::Column::Status.is_in(holding_statuses()))
            .count(self.db)
            .await?)
    }

    pub async fn count(&self, tenant_id: Uuid) -> AppResult<u64> {
        Ok(reservation::Entity::find()
            .filter(reservation::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await?)
    }

    pub async fn count_between(
        &self,
        tenant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<u64> {
        Ok(reservation::Entity::find()
            .filter(reservation::Column::TenantId.eq(tenant_id))
            .filter(reservation::Column::ReservationTime.gte(from))
            .filter(reservation::Column::ReservationTime.lt(to))
            .count(self.db)
            .await?)
    }
}

fn holding_statuses() -> Vec<&'static str> {
    ReservationStatus::HOLDING.iter().map(|s| s.as_str()).collect()
}
