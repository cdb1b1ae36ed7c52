use airtrip_core::{CoreResult, NewTrip, Pagination, Trip, TripFilter, TripRepository};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::info;

use crate::StoreError;

/// On-disk snapshot format of the memory backend.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    trips: Vec<Trip>,
}

/// List-backed trip store, optionally seeded from and flushed to a JSON file.
pub struct MemoryTripRepository {
    trips: RwLock<Vec<Trip>>,
    file_path: Option<PathBuf>,
    rollback: bool,
}

impl MemoryTripRepository {
    /// Empty store with no backing file.
    pub fn new() -> Self {
        Self {
            trips: RwLock::new(Vec::new()),
            file_path: None,
            rollback: true,
        }
    }

    /// Loads `file_path` when it exists, starts empty otherwise. With
    /// `rollback = false` the snapshot is written back on `disconnect`.
    pub async fn connect(file_path: &Path, rollback: bool) -> Result<Self, StoreError> {
        let mut snapshot = match tokio::fs::read(file_path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e.into()),
        };
        snapshot.trips.sort_by_key(|t| t.id);

        info!("Loaded {} trips from {}", snapshot.trips.len(), file_path.display());

        Ok(Self {
            trips: RwLock::new(snapshot.trips),
            file_path: Some(file_path.to_path_buf()),
            rollback,
        })
    }
}

impl Default for MemoryTripRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TripRepository for MemoryTripRepository {
    async fn select(&self, filter: &TripFilter, pagination: Pagination) -> CoreResult<Vec<Trip>> {
        let trips = self.trips.read().await;
        Ok(pagination.apply(trips.iter().filter(|t| filter.matches(t)).cloned()))
    }

    async fn select_by_id(&self, id: i64) -> CoreResult<Option<Trip>> {
        let trips = self.trips.read().await;
        Ok(trips.iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, trip: NewTrip) -> CoreResult<Trip> {
        trip.validate()?;
        let mut trips = self.trips.write().await;
        // Ids stay sorted, so the next one follows the last
        let next_id = trips.last().map_or(1, |t| t.id + 1);
        let trip = trip.with_id(next_id);
        trips.push(trip.clone());
        Ok(trip)
    }

    async fn update(&self, id: i64, trip: NewTrip) -> CoreResult<Option<Trip>> {
        trip.validate()?;
        let mut trips = self.trips.write().await;
        match trips.iter_mut().find(|t| t.id == id) {
            Some(slot) => {
                *slot = trip.with_id(id);
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> CoreResult<bool> {
        let mut trips = self.trips.write().await;
        let before = trips.len();
        trips.retain(|t| t.id != id);
        Ok(trips.len() != before)
    }

    async fn disconnect(&self) -> CoreResult<()> {
        let Some(path) = self.file_path.as_ref().filter(|_| !self.rollback) else {
            return Ok(());
        };

        let snapshot = Snapshot { trips: self.trips.read().await.clone() };
        let json = serde_json::to_vec_pretty(&snapshot).map_err(StoreError::from)?;
        tokio::fs::write(path, json).await.map_err(StoreError::from)?;
        info!("Flushed {} trips to {}", snapshot.trips.len(), path.display());
        Ok(())
    }
}
