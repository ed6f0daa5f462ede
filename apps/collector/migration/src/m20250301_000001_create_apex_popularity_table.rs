use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ApexPopularity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ApexPopularity::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(ApexPopularity::TotalViewers).big_integer().not_null())
                    .col(ColumnDef::new(ApexPopularity::GameId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(ApexPopularity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApexPopularity::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum ApexPopularity {
    Table,
    Id,
    TotalViewers,
    GameId,
    CreatedAt,
}
