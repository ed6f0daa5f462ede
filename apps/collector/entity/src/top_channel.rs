use sea_orm::entity::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "top_channels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub snapshot_id: i32,
    pub channel_name: String,
    pub user_login: String,
    pub viewer_count: i64,
    pub user_name: String,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub language: String,
    #[sea_orm(column_type = "Text")]
    pub thumbnail_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::apex_popularity::Entity",
        from = "Column::SnapshotId",
        to = "super::apex_popularity::Column::Id",
        on_delete = "Cascade"
    )]
    ApexPopularity,
}

impl Related<super::apex_popularity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApexPopularity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
