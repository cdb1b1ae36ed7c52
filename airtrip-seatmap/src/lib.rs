pub mod layout;
pub mod ordering;
pub mod seat;
pub mod template;

pub use layout::{Row, RowRange, SeatMap, SeatMapBlock, SeatMapError, SeatMapView, SeatView};
pub use ordering::{order_seat, OrderError};
pub use seat::{SeatId, SeatStatus};
pub use template::generate_seat_map;
