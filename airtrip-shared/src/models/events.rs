use serde::{Deserialize, Serialize};

/// Published once a seat flips to Ordered.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderEvent {
    pub seat: String,
    pub trip_id: i64,
}

/// Frames a client may send on a trip websocket.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Order { seat: String },
}

/// Frames the server sends on a trip websocket.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Order(OrderEvent),
    Error { descr: String },
}

impl ServerMessage {
    pub fn error(descr: impl ToString) -> Self {
        ServerMessage::Error { descr: descr.to_string() }
    }
}

impl From<OrderEvent> for ServerMessage {
    fn from(event: OrderEvent) -> Self {
        ServerMessage::Order(event)
    }
}
