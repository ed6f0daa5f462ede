use common::logger::{create_child_logger, init_root_logger};
use common::{Settings, SnapshotRun};
use slog::{error, info};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let root = init_root_logger();
    let app_logger = create_child_logger(&root, "apex_snapshot");

    info!(app_logger, "===== STARTING APEX LEGENDS DATA COLLECTION =====");

    // Nothing touches the network until every required variable is present
    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!(app_logger, "{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(app_logger, "Loaded settings: {:?}", settings);

    let run = match SnapshotRun::new(&settings, app_logger.clone()) {
        Ok(run) => run,
        Err(e) => {
            error!(app_logger, "Failed to initialise collector: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run.run().await {
        Ok(summary) => {
            info!(
                app_logger,
                "Snapshot {} saved", summary.snapshot_id;
                "game_id" => &summary.game_id,
                "total_viewers" => summary.total_viewers,
                "streams" => summary.stream_count,
                "pages" => summary.pages,
                "partial" => summary.partial
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(app_logger, "{}. Nothing was saved.", e);
            ExitCode::FAILURE
        }
    }
}
