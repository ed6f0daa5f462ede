use thiserror::Error;

use crate::pipeline::RunStage;

/// Failures while loading the environment configuration.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid database URL: {0}")]
    DatabaseUrl(String),
}

/// Stage errors of a single snapshot run.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Category not found: {0}")]
    NotFound(String),

    #[error("Collection error on page {page}: {message}")]
    Collection { page: u32, message: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    #[error("Invalid stream start timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("Viewer count {0} does not fit the database column")]
    Overflow(u64),
}

/// A run that stopped before a snapshot was persisted.
#[derive(Error, Debug)]
#[error("Run aborted after stage {stage}: {source}")]
pub struct RunAborted {
    /// Last stage that completed before the failure.
    pub stage: RunStage,
    #[source]
    pub source: SnapshotError,
}
