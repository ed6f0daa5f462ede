use sea_orm::entity::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One viewership snapshot per collection run.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "apex_popularity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub total_viewers: i64,
    pub game_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::top_channel::Entity")]
    TopChannel,
}

impl Related<super::top_channel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TopChannel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
