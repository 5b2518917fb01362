use sea_orm_migration::prelude::*;

use crate::m20240101_000002_create_customers_table::Customers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalesOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesOrders::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesOrders::OrderNumber)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SalesOrders::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(SalesOrders::OrderDate).timestamp().not_null())
                    .col(ColumnDef::new(SalesOrders::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(SalesOrders::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(SalesOrders::TotalAmount)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(SalesOrders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(SalesOrders::UpdatedAt).timestamp().null())
                    .col(
                        ColumnDef::new(SalesOrders::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_orders_customer")
                            .from(SalesOrders::Table, SalesOrders::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_orders_status")
                    .table(SalesOrders::Table)
                    .col(SalesOrders::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SalesOrders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SalesOrders {
    Table,
    Id,
    OrderNumber,
    CustomerId,
    OrderDate,
    CreatedBy,
    Status,
    TotalAmount,
    CreatedAt,
    UpdatedAt,
    Version,
}
