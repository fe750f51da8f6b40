//! Ledger schema.
//!
//! - `categories`: budget envelopes with their three balances in minor units
//! - `expenses`: spending posted against exactly one category
//!
//! `expenses.category_id` uses `ON DELETE RESTRICT`, so a category that still
//! has expenses cannot be removed.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    PlannedBudgetMinor,
    RemainingBalanceMinor,
    ActualBalanceMinor,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    CategoryId,
    AmountMinor,
    Date,
    Description,
    PaymentMethod,
    EntityId,
    EntityType,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Categories::PlannedBudgetMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Categories::RemainingBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Categories::ActualBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::CategoryId).string().not_null())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Date).date())
                    .col(ColumnDef::new(Expenses::Description).string())
                    .col(ColumnDef::new(Expenses::PaymentMethod).string())
                    .col(ColumnDef::new(Expenses::EntityId).big_integer())
                    .col(ColumnDef::new(Expenses::EntityType).string())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-category_id-created_at")
                    .table(Expenses::Table)
                    .col(Expenses::CategoryId)
                    .col(Expenses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Expenses first, they reference categories.
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
