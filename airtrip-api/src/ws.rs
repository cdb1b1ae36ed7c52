//! Trip websocket: clients order seats and watch everyone else's orders.

use airtrip_shared::{ClientMessage, OrderEvent, ServerMessage};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    feed::{run_trip_feed, TripFeed},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/ws/{trip_id}", get(trip_ws))
}

async fn trip_ws(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, trip_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, trip_id: i64) {
    let (sink, stream) = socket.split();
    serve_connection(sink, stream, state, trip_id).await;
}

/// Runs one connection until the peer leaves, the server shuts down or the
/// socket stops accepting writes, then unregisters it from the fanout.
async fn serve_connection<Si, St>(sink: Si, stream: St, state: AppState, trip_id: i64)
where
    Si: Sink<Message> + Unpin + Send + 'static,
    St: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let subscription = state.fanout.register().await;
    let subscriber = subscription.id();
    info!(trip_id, %subscriber, "Websocket connected");

    let mut writer = tokio::spawn(write_frames(sink, outbound_rx));
    let feed = tokio::spawn(run_trip_feed(
        TripFeed::new(trip_id),
        subscription,
        outbound_tx.clone(),
    ));

    let writer_done = tokio::select! {
        _ = receive_frames(stream, &state, trip_id, &outbound_tx) => false,
        _ = &mut writer => {
            debug!(trip_id, %subscriber, "Websocket write failed, closing");
            true
        }
    };

    state.fanout.unregister(subscriber).await;
    feed.abort();
    // Cancelled or finished, either way the feed's sender is dropped once this resolves
    let _ = feed.await;
    drop(outbound_tx);
    if !writer_done {
        // Writer flushes queued replies, then sends Close
        let _ = writer.await;
    }

    info!(trip_id, %subscriber, "Websocket disconnected");
}

/// Reads client frames until the peer leaves or the server shuts down.
async fn receive_frames<St>(
    mut stream: St,
    state: &AppState,
    trip_id: i64,
    outbound: &mpsc::UnboundedSender<ServerMessage>,
) where
    St: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            _ = state.shutdown.cancelled() => {
                debug!(trip_id, "Server shutting down, closing websocket");
                return;
            }
            frame = stream.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                handle_text(state, trip_id, text.as_str(), outbound).await
            }
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug!(trip_id, "Websocket read failed: {}", e);
                return;
            }
        }
    }
}

async fn handle_text(
    state: &AppState,
    trip_id: i64,
    text: &str,
    outbound: &mpsc::UnboundedSender<ServerMessage>,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(trip_id, "Ignoring malformed client frame: {}", e);
            return;
        }
    };

    match message {
        ClientMessage::Order { seat } => match state.seat_maps.order(trip_id, &seat) {
            Ok(seat_id) => {
                info!(trip_id, seat = %seat_id, "Seat ordered");
                let event = OrderEvent { seat: seat_id.to_string(), trip_id };
                state.fanout.multicast(event).await;
            }
            Err(e) => {
                debug!(trip_id, seat = %seat, "Order rejected: {}", e);
                let _ = outbound.send(ServerMessage::error(e));
            }
        },
    }
}

async fn write_frames<Si>(mut sink: Si, mut outbound: mpsc::UnboundedReceiver<ServerMessage>)
where
    Si: Sink<Message> + Unpin,
{
    while let Some(message) = outbound.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode websocket frame: {}", e);
                continue;
            }
        };
        if sink.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }
    let _ = sink.send(Message::Close(None)).await;
}
