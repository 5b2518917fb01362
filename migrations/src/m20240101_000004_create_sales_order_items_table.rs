use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_products_table::Products;
use crate::m20240101_000003_create_sales_orders_table::SalesOrders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalesOrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesOrderItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SalesOrderItems::OrderId).uuid().not_null())
                    .col(ColumnDef::new(SalesOrderItems::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(SalesOrderItems::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(SalesOrderItems::UnitPrice)
                            .decimal()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SalesOrderItems::Total).decimal().not_null())
                    .col(
                        ColumnDef::new(SalesOrderItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SalesOrderItems::UpdatedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_order_items_order")
                            .from(SalesOrderItems::Table, SalesOrderItems::OrderId)
                            .to(SalesOrders::Table, SalesOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_order_items_product")
                            .from(SalesOrderItems::Table, SalesOrderItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_order_items_order")
                    .table(SalesOrderItems::Table)
                    .col(SalesOrderItems::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SalesOrderItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SalesOrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    Quantity,
    UnitPrice,
    Total,
    CreatedAt,
    UpdatedAt,
}
