//! Create maintenance_records table

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_members::Members;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MaintenanceRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::MemberId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::FlatNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::MemberName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::MemberType)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::CollectionDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::PreviousUnitUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::NewReadingUnits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::TotalUnits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::WaterUnitRate)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::WaterMaintenanceAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::FixedMaintenanceRate)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::FixedMaintenanceAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::PreviousPendingAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::FineAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(MaintenanceRecords::FineReason).string())
                    .col(
                        ColumnDef::new(MaintenanceRecords::TotalMaintenanceAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::CollectionAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::PendingAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::UpdateHistory)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_records_member")
                            .from(MaintenanceRecords::Table, MaintenanceRecords::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_records_member")
                    .table(MaintenanceRecords::Table)
                    .col(MaintenanceRecords::MemberId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_records_collection_date")
                    .table(MaintenanceRecords::Table)
                    .col(MaintenanceRecords::CollectionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MaintenanceRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MaintenanceRecords {
    Table,
    Id,
    MemberId,
    FlatNumber,
    MemberName,
    MemberType,
    CollectionDate,
    PreviousUnitUsed,
    NewReadingUnits,
    TotalUnits,
    WaterUnitRate,
    WaterMaintenanceAmount,
    FixedMaintenanceRate,
    FixedMaintenanceAmount,
    PreviousPendingAmount,
    FineAmount,
    FineReason,
    TotalMaintenanceAmount,
    CollectionAmount,
    PendingAmount,
    UpdateHistory,
    CreatedAt,
    UpdatedAt,
}
