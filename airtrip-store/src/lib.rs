pub mod app_config;
pub mod fanout;
pub mod memory_repo;
pub mod sqlite_repo;

use std::sync::Arc;

use airtrip_core::{CoreError, TripRepository};
use app_config::{DatabaseBackend, DatabaseConfig};

pub use fanout::{FanoutQueue, QueueMessage, SubscriberId, Subscription};
pub use memory_repo::MemoryTripRepository;
pub use sqlite_repo::SqliteTripRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed storage file: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::StorageError(err.to_string())
    }
}

/// Opens the trip store selected by `database.backend`.
pub async fn connect_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn TripRepository>, StoreError> {
    match config.backend {
        DatabaseBackend::Memory => {
            let repo = MemoryTripRepository::connect(&config.file_path, config.rollback).await?;
            Ok(Arc::new(repo))
        }
        DatabaseBackend::Sqlite => {
            let repo = SqliteTripRepository::new(&config.url).await?;
            repo.migrate().await?;
            Ok(Arc::new(repo))
        }
    }
}
