//! Migration: Store catalog, coupons, carts and orders.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_platform_tables::{Tenants, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Categories::ParentId).uuid().null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Slug).string_len(100).not_null())
                    .col(ColumnDef::new(Categories::Description).text().null())
                    .col(ColumnDef::new(Categories::SortOrder).integer().not_null().default(0))
                    .col(ColumnDef::new(Categories::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Categories::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Categories::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_tenant")
                            .from(Categories::Table, Categories::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_categories_tenant_slug")
                    .table(Categories::Table)
                    .col(Categories::TenantId)
                    .col(Categories::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShopProducts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ShopProducts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ShopProducts::TenantId).uuid().not_null())
                    .col(ColumnDef::new(ShopProducts::CategoryId).uuid().null())
                    .col(ColumnDef::new(ShopProducts::Name).string().not_null())
                    .col(ColumnDef::new(ShopProducts::Slug).string_len(100).not_null())
                    .col(ColumnDef::new(ShopProducts::Description).text().null())
                    .col(ColumnDef::new(ShopProducts::Price).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(ShopProducts::CompareAtPrice).decimal_len(12, 2).null())
                    .col(ColumnDef::new(ShopProducts::Sku).string_len(64).null())
                    .col(ColumnDef::new(ShopProducts::Stock).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(ShopProducts::LowStockThreshold)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(ColumnDef::new(ShopProducts::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(ShopProducts::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ShopProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopProducts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shop_products_tenant")
                            .from(ShopProducts::Table, ShopProducts::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shop_products_category")
                            .from(ShopProducts::Table, ShopProducts::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shop_products_tenant_slug")
                    .table(ShopProducts::Table)
                    .col(ShopProducts::TenantId)
                    .col(ShopProducts::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Coupons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Coupons::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Coupons::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Coupons::Code).string_len(50).not_null())
                    .col(ColumnDef::new(Coupons::Description).text().null())
                    .col(ColumnDef::new(Coupons::DiscountType).string_len(16).not_null())
                    .col(ColumnDef::new(Coupons::DiscountValue).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Coupons::MinOrderAmount).decimal_len(12, 2).null())
                    .col(ColumnDef::new(Coupons::MaxUses).integer().null())
                    .col(ColumnDef::new(Coupons::UsedCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Coupons::StartsAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Coupons::ExpiresAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Coupons::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Coupons::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Coupons::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_coupons_tenant")
                            .from(Coupons::Table, Coupons::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_coupons_tenant_code")
                    .table(Coupons::Table)
                    .col(Coupons::TenantId)
                    .col(Coupons::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Carts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Carts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Carts::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Carts::UserId).uuid().not_null())
                    .col(ColumnDef::new(Carts::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Carts::ExpiresAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Carts::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Carts::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carts_tenant")
                            .from(Carts::Table, Carts::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carts_user")
                            .from(Carts::Table, Carts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CartItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CartItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CartItems::CartId).uuid().not_null())
                    .col(ColumnDef::new(CartItems::ProductId).uuid().not_null())
                    .col(ColumnDef::new(CartItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(CartItems::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(CartItems::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_items_cart")
                            .from(CartItems::Table, CartItems::CartId)
                            .to(Carts::Table, Carts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_items_product")
                            .from(CartItems::Table, CartItems::ProductId)
                            .to(ShopProducts::Table, ShopProducts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cart_items_cart_product")
                    .table(CartItems::Table)
                    .col(CartItems::CartId)
                    .col(CartItems::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Orders::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Orders::UserId).uuid().not_null())
                    .col(ColumnDef::new(Orders::OrderNumber).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Orders::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Orders::Subtotal).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Orders::DiscountAmount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Orders::TaxAmount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Orders::ShippingAmount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Orders::Total).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Orders::CouponId).uuid().null())
                    .col(ColumnDef::new(Orders::CouponCode).string_len(50).null())
                    .col(ColumnDef::new(Orders::ShippingAddress).json_binary().not_null())
                    .col(ColumnDef::new(Orders::BillingAddress).json_binary().not_null())
                    .col(ColumnDef::new(Orders::Notes).text().null())
                    .col(ColumnDef::new(Orders::ShippedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Orders::DeliveredAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Orders::CancelledAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Orders::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_tenant")
                            .from(Orders::Table, Orders::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_tenant_created")
                    .table(Orders::Table)
                    .col(Orders::TenantId)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrderItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                    .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                    .col(ColumnDef::new(OrderItems::ProductName).string().not_null())
                    .col(ColumnDef::new(OrderItems::UnitPrice).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(OrderItems::Total).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(OrderItems::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CartItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Carts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Coupons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShopProducts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    TenantId,
    ParentId,
    Name,
    Slug,
    Description,
    SortOrder,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ShopProducts {
    Table,
    Id,
    TenantId,
    CategoryId,
    Name,
    Slug,
    Description,
    Price,
    CompareAtPrice,
    Sku,
    Stock,
    LowStockThreshold,
    IsActive,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Coupons {
    Table,
    Id,
    TenantId,
    Code,
    Description,
    DiscountType,
    DiscountValue,
    MinOrderAmount,
    MaxUses,
    UsedCount,
    StartsAt,
    ExpiresAt,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Carts {
    Table,
    Id,
    TenantId,
    UserId,
    Status,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CartItems {
    Table,
    Id,
    CartId,
    ProductId,
    Quantity,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    TenantId,
    UserId,
    OrderNumber,
    Status,
    Subtotal,
    DiscountAmount,
    TaxAmount,
    ShippingAmount,
    Total,
    CouponId,
    CouponCode,
    ShippingAddress,
    BillingAddress,
    Notes,
    ShippedAt,
    DeliveredAt,
    CancelledAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    ProductName,
    UnitPrice,
    Quantity,
    Total,
    CreatedAt,
}
