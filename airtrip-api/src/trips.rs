use airtrip_core::Trip;
use airtrip_seatmap::{SeatMapView, SeatView};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct TripPageResponse {
    pub id: i64,
    /// `null` when the trip is unknown to the store; the seat map exists regardless.
    pub trip: Option<Trip>,
    pub ws_url: String,
    #[serde(flatten)]
    pub seat_map: SeatMapView,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/trips/{trip_id}", get(trip_page))
        .route("/trips/{trip_id}/seats", get(trip_seats))
}

async fn health() -> &'static str {
    "ok"
}

async fn trip_page(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripPageResponse>, AppError> {
    let trip = state.trips.select_by_id(trip_id).await?;
    let seat_map = state.seat_maps.with_trip(trip_id, |map| map.grid());

    Ok(Json(TripPageResponse {
        id: trip_id,
        trip,
        ws_url: state.ws_url(trip_id),
        seat_map,
    }))
}

async fn trip_seats(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> Json<Vec<SeatView>> {
    Json(state.seat_maps.with_trip(trip_id, |map| map.listing()))
}
