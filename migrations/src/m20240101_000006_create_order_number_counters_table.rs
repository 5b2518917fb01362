use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderNumberCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderNumberCounters::Id)
                            .integer()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderNumberCounters::LastValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Seed the single allocator row so order creation can lock it.
        manager
            .exec_stmt(
                Query::insert()
                    .into_table(OrderNumberCounters::Table)
                    .columns([OrderNumberCounters::Id, OrderNumberCounters::LastValue])
                    .values_panic([1.into(), 0i64.into()])
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderNumberCounters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OrderNumberCounters {
    Table,
    Id,
    LastValue,
}
