//! Create expenses table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::DateFrom).date().not_null())
                    .col(ColumnDef::new(Expenses::DateTo).date().not_null())
                    .col(ColumnDef::new(Expenses::Category).string_len(20).not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Expenses::PaymentMode)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Expenses::PaymentStatus)
                            .string_len(10)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Expenses::VendorName).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::VendorType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::VendorContact).string())
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Expenses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_date_from")
                    .table(Expenses::Table)
                    .col(Expenses::DateFrom)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Expenses {
    Table,
    Id,
    DateFrom,
    DateTo,
    Category,
    Description,
    Amount,
    PaymentMode,
    PaymentStatus,
    VendorName,
    VendorType,
    VendorContact,
    CreatedAt,
    UpdatedAt,
}
