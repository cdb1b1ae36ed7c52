use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{NewTrip, Plane, Trip};
use crate::CoreResult;

/// Trip catalogue access. Implemented by the in-memory and SQLite stores;
/// the backend is picked from configuration at startup.
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn select(&self, filter: &TripFilter, pagination: Pagination) -> CoreResult<Vec<Trip>>;

    async fn select_by_id(&self, id: i64) -> CoreResult<Option<Trip>>;

    async fn insert(&self, trip: NewTrip) -> CoreResult<Trip>;

    /// Returns `None` when no trip has this id.
    async fn update(&self, id: i64, trip: NewTrip) -> CoreResult<Option<Trip>>;

    async fn delete(&self, id: i64) -> CoreResult<bool>;

    /// Flush and release the backend. Called once at shutdown.
    async fn disconnect(&self) -> CoreResult<()>;
}

/// Limit/offset window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: default_limit(), offset: 0 }
    }
}

impl Pagination {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// 1-based page numbering; page 0 is treated as page 1.
    pub fn from_page(page: u32, page_size: u32) -> Self {
        Self {
            limit: page_size,
            offset: page.saturating_sub(1).saturating_mul(page_size),
        }
    }

    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Trip search criteria. Every set field must match; `town_*` are
/// case-insensitive substring matches, time bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TripFilter {
    pub company: Option<i64>,
    pub companies: Option<Vec<i64>>,
    pub plane: Option<Plane>,
    pub planes: Option<Vec<Plane>>,
    pub town_from: Option<String>,
    pub town_to: Option<String>,
    pub time_out_le: Option<DateTime<Utc>>,
    pub time_out_ge: Option<DateTime<Utc>>,
    pub time_in_le: Option<DateTime<Utc>>,
    pub time_in_ge: Option<DateTime<Utc>>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl TripFilter {
    pub fn matches(&self, trip: &Trip) -> bool {
        self.company.map_or(true, |c| trip.company == c)
            && self.companies.as_ref().map_or(true, |cs| cs.contains(&trip.company))
            && self.plane.map_or(true, |p| trip.plane == p)
            && self.planes.as_ref().map_or(true, |ps| ps.contains(&trip.plane))
            && self.town_from.as_deref().map_or(true, |t| contains_ignore_case(&trip.town_from, t))
            && self.town_to.as_deref().map_or(true, |t| contains_ignore_case(&trip.town_to, t))
            && self.time_out_le.map_or(true, |t| trip.time_out <= t)
            && self.time_out_ge.map_or(true, |t| trip.time_out >= t)
            && self.time_in_le.map_or(true, |t| trip.time_in <= t)
            && self.time_in_ge.map_or(true, |t| trip.time_in >= t)
    }
}
