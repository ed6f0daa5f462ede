use crate::config::Settings;
use crate::error::{RunAborted, SnapshotError};
use crate::stats::Snapshot;
use crate::store::SnapshotStore;
use crate::twitch::TwitchClient;
use slog::{Logger, debug, info, o, warn};
use std::fmt;

/// The tracked category, matched case-insensitively against search results.
pub const CATEGORY_NAME: &str = "Apex Legends";

/// Progress of a run. Any stage may end in [`RunAborted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Init,
    Authenticated,
    CategoryResolved,
    StreamsCollected,
    Aggregated,
    Persisted,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Init => "init",
            RunStage::Authenticated => "authenticated",
            RunStage::CategoryResolved => "category_resolved",
            RunStage::StreamsCollected => "streams_collected",
            RunStage::Aggregated => "aggregated",
            RunStage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub snapshot_id: i32,
    pub game_id: String,
    pub total_viewers: u64,
    pub stream_count: usize,
    pub top_channels: usize,
    pub pages: u32,
    /// Stream collection stopped on a failed page.
    pub partial: bool,
}

fn aborted(stage: RunStage) -> impl FnOnce(SnapshotError) -> RunAborted {
    move |source| RunAborted { stage, source }
}

/// One fetch, aggregate and store pass.
pub struct SnapshotRun {
    twitch: TwitchClient,
    store: SnapshotStore,
    logger: Logger,
}

impl SnapshotRun {
    pub fn new(settings: &Settings, logger: Logger) -> Result<Self, SnapshotError> {
        let twitch = TwitchClient::new(settings, logger.clone())?;
        let store = SnapshotStore::new(settings.database_url()?, settings.db_migrate, logger.clone());

        Ok(Self::from_parts(twitch, store, logger))
    }

    pub fn from_parts(twitch: TwitchClient, store: SnapshotStore, logger: Logger) -> Self {
        Self {
            twitch,
            store,
            logger: logger.new(o!("stage" => "pipeline")),
        }
    }

    fn advance(&self, stage: &mut RunStage, next: RunStage) {
        debug!(self.logger, "Stage {} -> {}", stage, next);
        *stage = next;
    }

    pub async fn run(&self) -> Result<RunSummary, RunAborted> {
        let mut stage = RunStage::Init;

        let token = self.twitch.access_token().await.map_err(aborted(stage))?;
        self.advance(&mut stage, RunStage::Authenticated);

        let game_id = self
            .twitch
            .find_category(&token, CATEGORY_NAME)
            .await
            .map_err(aborted(stage))?;
        self.advance(&mut stage, RunStage::CategoryResolved);

        let collection = self.twitch.collect_streams(&token, &game_id).await;
        info!(self.logger, "Total streams found: {}", collection.streams.len());
        if let Some(e) = &collection.halted {
            warn!(
                self.logger,
                "Stream collection stopped early, keeping {} streams: {}",
                collection.streams.len(),
                e
            );
        }
        self.advance(&mut stage, RunStage::StreamsCollected);

        let snapshot = Snapshot::from_streams(&collection.streams);
        match snapshot.top_channels.first() {
            None => warn!(self.logger, "No active streams found. Saving empty dataset."),
            Some(top) => {
                info!(self.logger, "Total viewers: {}", snapshot.total_viewers);
                info!(
                    self.logger,
                    "Top channel: {} ({}) with {} viewers",
                    top.channel_name,
                    top.user_login,
                    top.viewer_count
                );
                debug!(
                    self.logger,
                    "Sample data: title={:?}, started_at={}",
                    top.title,
                    top.started_at
                );
            }
        }
        self.advance(&mut stage, RunStage::Aggregated);

        let snapshot_id = self
            .store
            .save(&game_id, &snapshot)
            .await
            .map_err(aborted(stage))?;
        self.advance(&mut stage, RunStage::Persisted);

        Ok(RunSummary {
            snapshot_id,
            game_id,
            total_viewers: snapshot.total_viewers,
            stream_count: collection.streams.len(),
            top_channels: snapshot.top_channels.len(),
            pages: collection.pages,
            partial: collection.halted.is_some(),
        })
    }
}
