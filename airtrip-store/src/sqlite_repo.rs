use airtrip_core::{CoreResult, NewTrip, Pagination, Trip, TripFilter, TripRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::StoreError;

const TRIP_COLUMNS: &str = "id, company, plane, town_from, town_to, time_out, time_in";

#[derive(Debug, sqlx::FromRow)]
struct TripRow {
    id: i64,
    company: i64,
    plane: String,
    town_from: String,
    town_to: String,
    time_out: DateTime<Utc>,
    time_in: DateTime<Utc>,
}

impl TryFrom<TripRow> for Trip {
    type Error = airtrip_core::CoreError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        Ok(Trip {
            id: row.id,
            company: row.company,
            plane: row.plane.parse()?,
            town_from: row.town_from,
            town_to: row.town_to,
            time_out: row.time_out,
            time_in: row.time_in,
        })
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Clone)]
pub struct SqliteTripRepository {
    pub pool: SqlitePool,
}

impl SqliteTripRepository {
    pub async fn new(connection_string: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(connection_string)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

#[async_trait]
impl TripRepository for SqliteTripRepository {
    async fn select(&self, filter: &TripFilter, pagination: Pagination) -> CoreResult<Vec<Trip>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM trips WHERE 1 = 1", TRIP_COLUMNS));

        if let Some(company) = filter.company {
            query.push(" AND company = ").push_bind(company);
        }
        if let Some(companies) = &filter.companies {
            if companies.is_empty() {
                query.push(" AND 0");
            } else {
                query.push(" AND company IN (");
                let mut separated = query.separated(", ");
                for company in companies {
                    separated.push_bind(*company);
                }
                separated.push_unseparated(")");
            }
        }
        if let Some(plane) = filter.plane {
            query.push(" AND plane = ").push_bind(plane.as_str());
        }
        if let Some(planes) = &filter.planes {
            if planes.is_empty() {
                query.push(" AND 0");
            } else {
                query.push(" AND plane IN (");
                let mut separated = query.separated(", ");
                for plane in planes {
                    separated.push_bind(plane.as_str());
                }
                separated.push_unseparated(")");
            }
        }
        if let Some(town) = &filter.town_from {
            query
                .push(" AND lower(town_from) LIKE ")
                .push_bind(like_pattern(town))
                .push(" ESCAPE '\\'");
        }
        if let Some(town) = &filter.town_to {
            query
                .push(" AND lower(town_to) LIKE ")
                .push_bind(like_pattern(town))
                .push(" ESCAPE '\\'");
        }
        if let Some(t) = filter.time_out_le {
            query.push(" AND time_out <= ").push_bind(t);
        }
        if let Some(t) = filter.time_out_ge {
            query.push(" AND time_out >= ").push_bind(t);
        }
        if let Some(t) = filter.time_in_le {
            query.push(" AND time_in <= ").push_bind(t);
        }
        if let Some(t) = filter.time_in_ge {
            query.push(" AND time_in >= ").push_bind(t);
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(pagination.offset));

        let rows: Vec<TripRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)?;

        rows.into_iter().map(Trip::try_from).collect()
    }

    async fn select_by_id(&self, id: i64) -> CoreResult<Option<Trip>> {
        let row: Option<TripRow> =
            sqlx::query_as(&format!("SELECT {} FROM trips WHERE id = ?", TRIP_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::from)?;

        row.map(Trip::try_from).transpose()
    }

    async fn insert(&self, trip: NewTrip) -> CoreResult<Trip> {
        trip.validate()?;
        let result = sqlx::query(
            r#"
            INSERT INTO trips (company, plane, town_from, town_to, time_out, time_in)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trip.company)
        .bind(trip.plane.as_str())
        .bind(&trip.town_from)
        .bind(&trip.town_to)
        .bind(trip.time_out)
        .bind(trip.time_in)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(trip.with_id(result.last_insert_rowid()))
    }

    async fn update(&self, id: i64, trip: NewTrip) -> CoreResult<Option<Trip>> {
        trip.validate()?;
        let result = sqlx::query(
            r#"
            UPDATE trips
            SET company = ?, plane = ?, town_from = ?, town_to = ?, time_out = ?, time_in = ?
            WHERE id = ?
            "#,
        )
        .bind(trip.company)
        .bind(trip.plane.as_str())
        .bind(&trip.town_from)
        .bind(&trip.town_to)
        .bind(trip.time_out)
        .bind(trip.time_in)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(trip.with_id(id)))
    }

    async fn delete(&self, id: i64) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn disconnect(&self) -> CoreResult<()> {
        self.pool.close().await;
        info!("SQLite pool closed");
        Ok(())
    }
}
