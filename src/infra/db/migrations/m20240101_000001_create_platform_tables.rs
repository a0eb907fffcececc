//! Migration: Plans, tenants, users, modules and platform administration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Plans::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Plans::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Plans::DisplayName).string().not_null())
                    .col(ColumnDef::new(Plans::Description).text().null())
                    .col(ColumnDef::new(Plans::Price).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Plans::BillingCycle).string_len(16).not_null())
                    .col(ColumnDef::new(Plans::Features).json_binary().not_null())
                    .col(ColumnDef::new(Plans::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Plans::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Plans::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tenants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tenants::Name).string().not_null())
                    .col(ColumnDef::new(Tenants::Slug).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Tenants::BusinessType).string_len(16).not_null())
                    .col(ColumnDef::new(Tenants::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Tenants::PlanId).uuid().not_null())
                    .col(ColumnDef::new(Tenants::CustomLimits).json_binary().null())
                    .col(ColumnDef::new(Tenants::TrialStartDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Tenants::TrialEndDate).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Tenants::TrialConverted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tenants::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Tenants::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenants_plan")
                            .from(Tenants::Table, Tenants::PlanId)
                            .to(Plans::Table, Plans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().null())
                    .col(ColumnDef::new(Users::LastName).string().null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::LastLoginAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_tenant")
                            .from(Users::Table, Users::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_tenant_id")
                    .table(Users::Table)
                    .col(Users::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Modules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Modules::Name).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Modules::DisplayName).string().not_null())
                    .col(ColumnDef::new(Modules::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TenantModules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TenantModules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TenantModules::TenantId).uuid().not_null())
                    .col(ColumnDef::new(TenantModules::ModuleId).uuid().not_null())
                    .col(
                        ColumnDef::new(TenantModules::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TenantModules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_modules_tenant")
                            .from(TenantModules::Table, TenantModules::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_modules_module")
                            .from(TenantModules::Table, TenantModules::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenant_modules_unique")
                    .table(TenantModules::Table)
                    .col(TenantModules::TenantId)
                    .col(TenantModules::ModuleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlatformAdmins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlatformAdmins::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PlatformAdmins::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(PlatformAdmins::PasswordHash).string().not_null())
                    .col(ColumnDef::new(PlatformAdmins::Name).string().not_null())
                    .col(
                        ColumnDef::new(PlatformAdmins::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PlatformAdmins::LastLoginAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlatformAdmins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlatformAdmins::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminAuditLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdminAuditLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AdminAuditLogs::AdminId).uuid().not_null())
                    .col(ColumnDef::new(AdminAuditLogs::Action).string_len(64).not_null())
                    .col(ColumnDef::new(AdminAuditLogs::TargetType).string_len(32).not_null())
                    .col(ColumnDef::new(AdminAuditLogs::TargetId).uuid().null())
                    .col(ColumnDef::new(AdminAuditLogs::Details).json_binary().null())
                    .col(
                        ColumnDef::new(AdminAuditLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audit_logs_admin")
                            .from(AdminAuditLogs::Table, AdminAuditLogs::AdminId)
                            .to(PlatformAdmins::Table, PlatformAdmins::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_created_at")
                    .table(AdminAuditLogs::Table)
                    .col(AdminAuditLogs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminAuditLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlatformAdmins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TenantModules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Modules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Plans {
    Table,
    Id,
    Name,
    DisplayName,
    Description,
    Price,
    BillingCycle,
    Features,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Tenants {
    Table,
    Id,
    Name,
    Slug,
    BusinessType,
    Status,
    PlanId,
    CustomLimits,
    TrialStartDate,
    TrialEndDate,
    TrialConverted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Users {
    Table,
    Id,
    TenantId,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Role,
    IsActive,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Modules {
    Table,
    Id,
    Name,
    DisplayName,
    CreatedAt,
}

#[derive(Iden)]
enum TenantModules {
    Table,
    Id,
    TenantId,
    ModuleId,
    IsEnabled,
    CreatedAt,
}

#[derive(Iden)]
enum PlatformAdmins {
    Table,
    Id,
    Email,
    PasswordHash,
    Name,
    IsActive,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AdminAuditLogs {
    Table,
    Id,
    AdminId,
    Action,
    TargetType,
    TargetId,
    Details,
    CreatedAt,
}
