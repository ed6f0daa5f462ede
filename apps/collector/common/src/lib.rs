pub mod config;
pub mod error;
pub mod pipeline;
pub mod stats;
pub mod store;
pub mod twitch;

pub use config::Settings;
pub use error::{RunAborted, SettingsError, SnapshotError};
pub use pipeline::{RunStage, RunSummary, SnapshotRun};

pub mod logger {
    use slog::{Drain, FilterLevel, Logger, o};
    use slog_envlogger::LogBuilder;

    /// Terminal logger filtered by `RUST_LOG`, INFO when it is unset.
    pub fn init_root_logger() -> Logger {
        let decorator = slog_term::TermDecorator::new().stdout().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();

        let builder = LogBuilder::new(drain);
        let drain = match std::env::var("RUST_LOG") {
            Ok(filters) if !filters.trim().is_empty() => builder.parse(&filters),
            _ => builder.filter(None, FilterLevel::Info),
        }
        .build()
        .fuse();

        Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
    }

    pub fn create_child_logger(parent: &Logger, module: &str) -> Logger {
        parent.new(o!("module" => module.to_string()))
    }
}
