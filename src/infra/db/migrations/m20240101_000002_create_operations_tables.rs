//! Migration: Inventory, hotel and expense tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_platform_tables::Tenants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryProducts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InventoryProducts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InventoryProducts::TenantId).uuid().not_null())
                    .col(ColumnDef::new(InventoryProducts::Name).string().not_null())
                    .col(ColumnDef::new(InventoryProducts::Sku).string_len(64).null())
                    .col(ColumnDef::new(InventoryProducts::Category).string().null())
                    .col(ColumnDef::new(InventoryProducts::Description).text().null())
                    .col(ColumnDef::new(InventoryProducts::UnitPrice).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(InventoryProducts::CostPrice).decimal_len(12, 2).null())
                    .col(ColumnDef::new(InventoryProducts::Stock).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(InventoryProducts::LowStockThreshold)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(ColumnDef::new(InventoryProducts::Unit).string_len(32).not_null())
                    .col(
                        ColumnDef::new(InventoryProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryProducts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_products_tenant")
                            .from(InventoryProducts::Table, InventoryProducts::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_products_tenant_sku")
                    .table(InventoryProducts::Table)
                    .col(InventoryProducts::TenantId)
                    .col(InventoryProducts::Sku)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StockMovements::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(StockMovements::TenantId).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::MovementType).string_len(16).not_null())
                    .col(ColumnDef::new(StockMovements::Quantity).integer().not_null())
                    .col(ColumnDef::new(StockMovements::PreviousStock).integer().not_null())
                    .col(ColumnDef::new(StockMovements::NewStock).integer().not_null())
                    .col(ColumnDef::new(StockMovements::Reason).text().null())
                    .col(ColumnDef::new(StockMovements::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(StockMovements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movements_tenant")
                            .from(StockMovements::Table, StockMovements::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movements_product")
                            .from(StockMovements::Table, StockMovements::ProductId)
                            .to(InventoryProducts::Table, InventoryProducts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HotelTables::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(HotelTables::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(HotelTables::TenantId).uuid().not_null())
                    .col(ColumnDef::new(HotelTables::TableNumber).string_len(20).not_null())
                    .col(ColumnDef::new(HotelTables::Capacity).integer().not_null())
                    .col(ColumnDef::new(HotelTables::Location).string().null())
                    .col(ColumnDef::new(HotelTables::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(HotelTables::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HotelTables::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hotel_tables_tenant")
                            .from(HotelTables::Table, HotelTables::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hotel_tables_tenant_number")
                    .table(HotelTables::Table)
                    .col(HotelTables::TenantId)
                    .col(HotelTables::TableNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reservations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reservations::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::TableId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::CustomerName).string().not_null())
                    .col(ColumnDef::new(Reservations::CustomerPhone).string_len(32).null())
                    .col(ColumnDef::new(Reservations::CustomerEmail).string().null())
                    .col(ColumnDef::new(Reservations::PartySize).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::ReservationTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Reservations::Notes).text().null())
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_tenant")
                            .from(Reservations::Table, Reservations::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_table")
                            .from(Reservations::Table, Reservations::TableId)
                            .to(HotelTables::Table, HotelTables::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_table_time")
                    .table(Reservations::Table)
                    .col(Reservations::TableId)
                    .col(Reservations::ReservationTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Expenses::Description).text().null())
                    .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                    .col(ColumnDef::new(Expenses::PaymentMethod).string_len(32).null())
                    .col(ColumnDef::new(Expenses::Vendor).string().null())
                    .col(ColumnDef::new(Expenses::CreatedBy).uuid().null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Expenses::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_tenant")
                            .from(Expenses::Table, Expenses::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_tenant_date")
                    .table(Expenses::Table)
                    .col(Expenses::TenantId)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HotelTables::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryProducts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InventoryProducts {
    Table,
    Id,
    TenantId,
    Name,
    Sku,
    Category,
    Description,
    UnitPrice,
    CostPrice,
    Stock,
    LowStockThreshold,
    Unit,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum StockMovements {
    Table,
    Id,
    TenantId,
    ProductId,
    MovementType,
    Quantity,
    PreviousStock,
    NewStock,
    Reason,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum HotelTables {
    Table,
    Id,
    TenantId,
    TableNumber,
    Capacity,
    Location,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Reservations {
    Table,
    Id,
    TenantId,
    TableId,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    PartySize,
    ReservationTime,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    TenantId,
    Category,
    Amount,
    Description,
    ExpenseDate,
    PaymentMethod,
    Vendor,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
