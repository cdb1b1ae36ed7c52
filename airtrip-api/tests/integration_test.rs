use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use airtrip_api::{app, AppState};
use airtrip_core::{NewTrip, Plane, TripRepository};
use airtrip_store::MemoryTripRepository;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn test_state() -> AppState {
    let repo = MemoryTripRepository::new();
    repo.insert(NewTrip {
        company: 1,
        plane: Plane::Boeing787,
        town_from: "Lisbon".into(),
        town_to: "Madrid".into(),
        time_out: Utc.with_ymd_and_hms(2023, 6, 1, 8, 0, 0).unwrap(),
        time_in: Utc.with_ymd_and_hms(2023, 6, 1, 10, 30, 0).unwrap(),
    })
    .await
    .unwrap();

    AppState::new(Arc::new(repo), "http://localhost:8000")
}

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, trip_id: i64) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws/{trip_id}")).await.unwrap();
    client
}

async fn wait_for_subscribers(state: &AppState, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.fanout.len().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber count never reached expected value");
}

async fn send(client: &mut Client, frame: Value) {
    client.send(Message::Text(frame.to_string())).await.unwrap();
}

/// Next JSON text frame, skipping control frames.
async fn next_json(client: &mut Client, wait: Duration) -> Option<Value> {
    tokio::time::timeout(wait, async {
        while let Some(message) = client.next().await {
            if let Message::Text(text) = message.unwrap() {
                return Some(serde_json::from_str(&text).unwrap());
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

async fn expect_json(client: &mut Client) -> Value {
    next_json(client, Duration::from_secs(5)).await.expect("expected a frame")
}

async fn expect_silence(client: &mut Client) {
    assert_eq!(next_json(client, Duration::from_millis(200)).await, None);
}

#[tokio::test]
async fn test_order_broadcast_and_rejection() {
    let state = test_state().await;
    let addr = spawn_server(state.clone()).await;

    let mut alice = connect(addr, 7).await;
    let mut bob = connect(addr, 7).await;
    let mut carol = connect(addr, 8).await;
    wait_for_subscribers(&state, 3).await;

    send(&mut alice, json!({"type": "order", "seat": "A21"})).await;

    let broadcast = json!({"type": "order", "seat": "A21", "trip_id": 7});
    assert_eq!(expect_json(&mut bob).await, broadcast);
    assert_eq!(expect_json(&mut alice).await, broadcast);

    send(&mut alice, json!({"type": "order", "seat": "A21"})).await;
    assert_eq!(
        expect_json(&mut alice).await,
        json!({"type": "error", "descr": "Seat is already oredered!"})
    );
    expect_silence(&mut bob).await;
    expect_silence(&mut carol).await;

    // Same seat on another trip is still free
    send(&mut carol, json!({"type": "order", "seat": "A21"})).await;
    assert_eq!(
        expect_json(&mut carol).await,
        json!({"type": "order", "seat": "A21", "trip_id": 8})
    );
    expect_silence(&mut alice).await;
}

#[tokio::test]
async fn test_unknown_and_hidden_seats() {
    let state = test_state().await;
    let addr = spawn_server(state.clone()).await;
    let mut client = connect(addr, 1).await;

    for seat in ["A12", "A48", "I21", "B1", "21A"] {
        send(&mut client, json!({"type": "order", "seat": seat})).await;
        assert_eq!(
            expect_json(&mut client).await,
            json!({"type": "error", "descr": "Seat is not available"}),
            "seat {seat}"
        );
    }
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let state = test_state().await;
    let addr = spawn_server(state.clone()).await;
    let mut client = connect(addr, 3).await;

    client.send(Message::Text("not json".into())).await.unwrap();
    send(&mut client, json!({"type": "cancel", "seat": "A21"})).await;
    send(&mut client, json!({"type": "order"})).await;
    client.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
    expect_silence(&mut client).await;

    // Connection survives
    send(&mut client, json!({"type": "order", "seat": "K47"})).await;
    assert_eq!(
        expect_json(&mut client).await,
        json!({"type": "order", "seat": "K47", "trip_id": 3})
    );
}

#[tokio::test]
async fn test_disconnect_unregisters_subscriber() {
    let state = test_state().await;
    let addr = spawn_server(state.clone()).await;

    let mut first = connect(addr, 5).await;
    let second = connect(addr, 5).await;
    wait_for_subscribers(&state, 2).await;

    drop(second);
    wait_for_subscribers(&state, 1).await;

    send(&mut first, json!({"type": "order", "seat": "C22"})).await;
    assert_eq!(
        expect_json(&mut first).await,
        json!({"type": "order", "seat": "C22", "trip_id": 5})
    );

    first.close(None).await.unwrap();
    wait_for_subscribers(&state, 0).await;
}

#[tokio::test]
async fn test_shutdown_closes_websockets() {
    let state = test_state().await;
    let addr = spawn_server(state.clone()).await;
    let mut client = connect(addr, 2).await;
    wait_for_subscribers(&state, 1).await;

    state.shutdown.cancel();

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(message) = client.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => return true,
                Ok(_) => {}
            }
        }
        true
    })
    .await
    .unwrap();
    assert!(closed);
    wait_for_subscribers(&state, 0).await;
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
    let response = app(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let response = app(test_state().await)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_trip_page() {
    let state = test_state().await;
    state.seat_maps.order(1, "A21").unwrap();

    let (status, body) = get_json(state.clone(), "/trips/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["trip"]["town_from"], "Lisbon");
    assert_eq!(body["ws_url"], "ws://localhost:8000/ws/1");
    assert_eq!(body["literas"].as_array().unwrap().len(), 10);

    let blocks = body["blocks"].as_array().unwrap();
    let labels: Vec<_> = blocks.iter().map(|b| b["label"].as_str().unwrap()).collect();
    assert_eq!(labels, ["business_class", "premium_economy", "economy_class"]);

    // Economy row 21, column A
    let row = &blocks[2]["rows"][1];
    assert_eq!(row["num"], 21);
    assert_eq!(row["seats"][0], json!({"id": "A21", "rank": "economy_class", "status": "Ordered"}));
    // Aisle column E is hidden
    assert_eq!(row["seats"][4], Value::Null);
}

#[tokio::test]
async fn test_trip_page_without_stored_trip() {
    let state = test_state().await;
    let (status, body) = get_json(state.clone(), "/trips/99").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trip"], Value::Null);
    assert_eq!(state.seat_maps.len(), 1);

    let (status, _) = get_json(state, "/trips/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trip_seats_listing() {
    let state = test_state().await;
    let (status, body) = get_json(state.clone(), "/trips/4/seats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 294);

    state.seat_maps.order(4, "K47").unwrap();
    let (_, body) = get_json(state, "/trips/4/seats").await;
    let seats = body.as_array().unwrap();
    assert_eq!(seats.len(), 294);
    assert_eq!(seats.iter().filter(|s| s["status"] == "Ordered").count(), 1);
}
