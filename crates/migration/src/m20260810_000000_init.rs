//! Initial schema.
//!
//! - `users`: authentication and permission flags
//! - `items`: checkoutable stock with availability counters
//! - `transactions`: checkout lifecycle records

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
    Team,
    CanCheckout,
    CanApprove,
    CanManageItems,
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
    Name,
    Category,
    TotalQuantity,
    AvailableQuantity,
    IsCheckoutable,
    RequiresApproval,
    Status,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    TxNumber,
    ItemId,
    UserId,
    Kind,
    Status,
    Quantity,
    CheckoutDate,
    ExpectedReturnDate,
    ActualReturnDate,
    Purpose,
    Destination,
    Notes,
    ApprovedBy,
    ApprovalNotes,
    ApprovedAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(Users::Team).string())
                    .col(
                        ColumnDef::new(Users::CanCheckout)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CanApprove)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CanManageItems)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::Category).string())
                    .col(
                        ColumnDef::new(Items::TotalQuantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::AvailableQuantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Items::IsCheckoutable).boolean().not_null())
                    .col(ColumnDef::new(Items::RequiresApproval).boolean().not_null())
                    .col(
                        ColumnDef::new(Items::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Items::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Items::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-created_by")
                            .from(Items::Table, Items::CreatedBy)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-name-unique")
                    .table(Items::Table)
                    .col(Items::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::TxNumber).string().not_null())
                    .col(ColumnDef::new(Transactions::ItemId).string().not_null())
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CheckoutDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ExpectedReturnDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::ActualReturnDate).timestamp())
                    .col(ColumnDef::new(Transactions::Purpose).string())
                    .col(ColumnDef::new(Transactions::Destination).string())
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(ColumnDef::new(Transactions::ApprovedBy).string())
                    .col(ColumnDef::new(Transactions::ApprovalNotes).string())
                    .col(ColumnDef::new(Transactions::ApprovedAt).timestamp())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    // No foreign key on item_id: transaction history is kept
                    // forever and must survive deletion of the item row.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-tx_number-unique")
                    .table(Transactions::Table)
                    .col(Transactions::TxNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-item_id-status")
                    .table(Transactions::Table)
                    .col(Transactions::ItemId)
                    .col(Transactions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-status-expected_return_date")
                    .table(Transactions::Table)
                    .col(Transactions::Status)
                    .col(Transactions::ExpectedReturnDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
