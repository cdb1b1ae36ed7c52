pub mod models;

pub use models::{ClientMessage, OrderEvent, ServerMessage};
