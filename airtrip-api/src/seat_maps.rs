use airtrip_seatmap::{generate_seat_map, order_seat, OrderError, SeatId, SeatMap};
use dashmap::DashMap;

/// Seat maps keyed by trip id, created from the cabin template on first reference.
#[derive(Debug, Default)]
pub struct SeatMaps {
    maps: DashMap<i64, SeatMap>,
}

impl SeatMaps {
    pub fn new() -> Self {
        Self { maps: DashMap::new() }
    }

    /// Runs `f` on the trip's map while its shard lock is held. `f` is
    /// synchronous, so a read-check-write inside it cannot interleave with
    /// another connection.
    pub fn with_trip<R>(&self, trip_id: i64, f: impl FnOnce(&mut SeatMap) -> R) -> R {
        let mut entry = self.maps.entry(trip_id).or_insert_with(generate_seat_map);
        f(entry.value_mut())
    }

    pub fn order(&self, trip_id: i64, seat: &str) -> Result<SeatId, OrderError> {
        self.with_trip(trip_id, |map| order_seat(map, seat))
    }

    pub fn snapshot(&self, trip_id: i64) -> SeatMap {
        self.with_trip(trip_id, |map| map.clone())
    }

    /// Number of trips that have a seat map so far.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airtrip_seatmap::SeatStatus;

    #[test]
    fn test_maps_created_lazily() {
        let maps = SeatMaps::new();
        assert!(maps.is_empty());

        let map = maps.snapshot(3);
        assert_eq!(map, generate_seat_map());
        assert_eq!(maps.len(), 1);

        maps.snapshot(3);
        assert_eq!(maps.len(), 1);
    }

    #[test]
    fn test_trips_do_not_share_state() {
        let maps = SeatMaps::new();

        maps.order(1, "A21").unwrap();
        assert_eq!(maps.order(1, "A21"), Err(OrderError::AlreadyOrdered(SeatId::new('A', 21))));
        assert!(maps.order(2, "A21").is_ok());

        assert_eq!(maps.snapshot(1).status(SeatId::new('A', 21)), Some(SeatStatus::Ordered));
        assert_eq!(maps.snapshot(3).status(SeatId::new('A', 21)), Some(SeatStatus::Available));
    }

    #[test]
    fn test_concurrent_orders_single_winner() {
        let maps = std::sync::Arc::new(SeatMaps::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let maps = maps.clone();
                std::thread::spawn(move || maps.order(5, "C22").is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
