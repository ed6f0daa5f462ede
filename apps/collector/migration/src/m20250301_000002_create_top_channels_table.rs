use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_apex_popularity_table::ApexPopularity;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TopChannels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TopChannels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TopChannels::SnapshotId).integer().not_null())
                    .col(ColumnDef::new(TopChannels::ChannelName).string().not_null())
                    .col(ColumnDef::new(TopChannels::UserLogin).string().not_null())
                    .col(ColumnDef::new(TopChannels::ViewerCount).big_integer().not_null())
                    .col(ColumnDef::new(TopChannels::UserName).string().not_null())
                    .col(ColumnDef::new(TopChannels::Title).text().not_null())
                    .col(
                        ColumnDef::new(TopChannels::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TopChannels::Language).string_len(16).not_null())
                    .col(ColumnDef::new(TopChannels::ThumbnailUrl).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_top_channels_snapshot")
                            .from(TopChannels::Table, TopChannels::SnapshotId)
                            .to(ApexPopularity::Table, ApexPopularity::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_top_channels_snapshot_id")
                    .table(TopChannels::Table)
                    .col(TopChannels::SnapshotId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TopChannels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TopChannels {
    Table,
    Id,
    SnapshotId,
    ChannelName,
    UserLogin,
    ViewerCount,
    UserName,
    Title,
    StartedAt,
    Language,
    ThumbnailUrl,
}
