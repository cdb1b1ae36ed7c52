pub mod events;

pub use events::{ClientMessage, OrderEvent, ServerMessage};
