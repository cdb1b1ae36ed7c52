use std::sync::Arc;

use airtrip_core::TripRepository;
use airtrip_shared::OrderEvent;
use airtrip_store::FanoutQueue;
use tokio_util::sync::CancellationToken;

use crate::seat_maps::SeatMaps;

/// Everything a request or websocket connection needs. Built once in `main`
/// and dropped after the server has drained.
#[derive(Clone)]
pub struct AppState {
    pub seat_maps: Arc<SeatMaps>,
    pub fanout: Arc<FanoutQueue<OrderEvent>>,
    pub trips: Arc<dyn TripRepository>,
    /// Public base address, e.g. `http://localhost:8000`.
    pub address: String,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(trips: Arc<dyn TripRepository>, address: impl Into<String>) -> Self {
        Self {
            seat_maps: Arc::new(SeatMaps::new()),
            fanout: Arc::new(FanoutQueue::new()),
            trips,
            address: address.into(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Websocket url a browser should open for `trip_id`.
    pub fn ws_url(&self, trip_id: i64) -> String {
        let base = self.address.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{base}")
        };
        format!("{base}/ws/{trip_id}")
    }
}
