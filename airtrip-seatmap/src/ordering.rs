use crate::layout::SeatMap;
use crate::seat::{SeatId, SeatStatus};

/// Transition one seat from Available to Ordered.
///
/// Resolution goes seat id → block (row range) → column → row. Exactly one
/// status character changes on success; nothing changes on failure.
/// Contains no await point, so callers holding the map behind a lock get
/// an atomic check-and-write.
pub fn order_seat(seat_map: &mut SeatMap, seat_id: &str) -> Result<SeatId, OrderError> {
    let seat: SeatId = seat_id
        .parse()
        .map_err(|_| OrderError::NotFound(seat_id.to_string()))?;

    let pos = seat_map
        .locate(seat)
        .ok_or_else(|| OrderError::NotFound(seat_id.to_string()))?;

    match seat_map.status_at(pos) {
        Some(SeatStatus::Available) => {
            seat_map.set_status_at(pos, SeatStatus::Ordered);
            Ok(seat)
        }
        Some(SeatStatus::Ordered) => Err(OrderError::AlreadyOrdered(seat)),
        // Hidden seats are not addressable from outside
        Some(SeatStatus::NotAvailable | SeatStatus::NotExist) | None => {
            Err(OrderError::NotFound(seat_id.to_string()))
        }
    }
}

/// Display strings are part of the websocket protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Seat is not available")]
    NotFound(String),

    #[error("Seat is already oredered!")]
    AlreadyOrdered(SeatId),
}
