use crate::error::SnapshotError;
use crate::stats::{Snapshot, TopChannel};
use chrono::{DateTime, Utc};
use entity::{apex_popularity, top_channel};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, Set,
    TransactionTrait,
};
use slog::{Logger, debug, info, o, warn};

/// A top channel whose start time has been parsed for the timestamp column.
#[derive(Debug)]
struct ChannelRow<'a> {
    channel: &'a TopChannel,
    started_at: DateTime<Utc>,
}

fn parse_started_at(value: &str) -> Result<DateTime<Utc>, SnapshotError> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|source| SnapshotError::Timestamp {
            value: value.to_string(),
            source,
        })
}

/// Writes one snapshot and its top channels per call, over a connection that
/// lives only for that call.
pub struct SnapshotStore {
    database_url: String,
    migrate: bool,
    logger: Logger,
}

impl SnapshotStore {
    pub fn new(database_url: String, migrate: bool, logger: Logger) -> Self {
        Self {
            database_url,
            migrate,
            logger: logger.new(o!("stage" => "store")),
        }
    }

    /// Persists `snapshot` for `game_id` and returns the new snapshot id.
    /// Either every row commits or none do.
    pub async fn save(&self, game_id: &str, snapshot: &Snapshot) -> Result<i32, SnapshotError> {
        let total_viewers = i64::try_from(snapshot.total_viewers)
            .map_err(|_| SnapshotError::Overflow(snapshot.total_viewers))?;

        let rows = snapshot
            .top_channels
            .iter()
            .map(|channel| {
                Ok(ChannelRow {
                    channel,
                    started_at: parse_started_at(&channel.started_at)?,
                })
            })
            .collect::<Result<Vec<_>, SnapshotError>>()?;

        debug!(self.logger, "Connecting to database");
        let db = Database::connect(
            ConnectOptions::new(&self.database_url)
                .sqlx_logging(false)
                .to_owned(),
        )
        .await?;
        debug!(self.logger, "Database connection established");

        let result = self.migrate_and_write(&db, game_id, total_viewers, &rows).await;

        match db.close().await {
            Ok(()) => debug!(self.logger, "Database connection closed"),
            Err(e) => warn!(self.logger, "Failed to close database connection: {}", e),
        }

        result
    }

    async fn migrate_and_write(
        &self,
        db: &DatabaseConnection,
        game_id: &str,
        total_viewers: i64,
        rows: &[ChannelRow<'_>],
    ) -> Result<i32, SnapshotError> {
        if self.migrate {
            debug!(self.logger, "Running database migrations");
            Migrator::up(db, None).await?;
        }

        let txn = db.begin().await?;

        match insert_snapshot(&txn, game_id, total_viewers, rows).await {
            Ok(snapshot_id) => {
                txn.commit().await?;
                info!(
                    self.logger,
                    "Successfully saved data";
                    "snapshot_id" => snapshot_id,
                    "top_channels" => rows.len()
                );
                Ok(snapshot_id)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(self.logger, "Rollback failed: {}", rollback);
                }
                Err(e.into())
            }
        }
    }
}

async fn insert_snapshot(
    txn: &DatabaseTransaction,
    game_id: &str,
    total_viewers: i64,
    rows: &[ChannelRow<'_>],
) -> Result<i32, DbErr> {
    let now = Utc::now();

    let snapshot = apex_popularity::ActiveModel {
        total_viewers: Set(total_viewers),
        game_id: Set(game_id.to_string()),
        created_at: Set(now),
        ..Default::default()
    };
    let snapshot_id = apex_popularity::Entity::insert(snapshot)
        .exec(txn)
        .await?
        .last_insert_id;

    if rows.is_empty() {
        return Ok(snapshot_id);
    }

    let channels = rows.iter().map(|row| top_channel::ActiveModel {
        snapshot_id: Set(snapshot_id),
        channel_name: Set(row.channel.channel_name.clone()),
        user_login: Set(row.channel.user_login.clone()),
        viewer_count: Set(i64::from(row.channel.viewer_count)),
        user_name: Set(row.channel.user_name.clone()),
        title: Set(row.channel.title.clone()),
        started_at: Set(row.started_at),
        language: Set(row.channel.language.clone()),
        thumbnail_url: Set(row.channel.thumbnail_url.clone()),
        ..Default::default()
    });
    top_channel::Entity::insert_many(channels).exec(txn).await?;

    Ok(snapshot_id)
}
