pub mod models;
pub mod repository;

pub use models::{NewTrip, Plane, Trip};
pub use repository::{Pagination, TripFilter, TripRepository};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
