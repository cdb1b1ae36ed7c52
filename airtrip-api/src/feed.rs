//! Per-connection consumer of the fanout queue.
//!
//! ```text
//! Listening ──message──> Delivering ──other trip / forwarded──> Listening
//!                             │
//!                           Finish / outbound gone
//!                             v
//!                         Draining ──buffer discarded──> Closed
//! ```
//!
//! Delivery only pushes onto the connection's outbound queue, which never
//! blocks; the socket write happens in a separate writer task. Aborting the
//! feed at any await point therefore loses nothing but undelivered events.

use airtrip_shared::{OrderEvent, ServerMessage};
use airtrip_store::{QueueMessage, Subscription};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Listening,
    Delivering,
    Draining,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    Forward(ServerMessage),
    Skip,
    Close,
}

#[derive(Debug)]
pub struct TripFeed {
    trip_id: i64,
    state: FeedState,
    forwarded: usize,
    skipped: usize,
    discarded: usize,
}

impl TripFeed {
    pub fn new(trip_id: i64) -> Self {
        Self {
            trip_id,
            state: FeedState::Listening,
            forwarded: 0,
            skipped: 0,
            discarded: 0,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn forwarded(&self) -> usize {
        self.forwarded
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Decides what to do with one queued item.
    pub fn next_action(&mut self, message: QueueMessage<OrderEvent>) -> FeedAction {
        self.state = FeedState::Delivering;
        match message {
            QueueMessage::Finish => FeedAction::Close,
            QueueMessage::Message(event) if event.trip_id == self.trip_id => {
                FeedAction::Forward(ServerMessage::from(event))
            }
            QueueMessage::Message(_) => FeedAction::Skip,
        }
    }

    fn close(&mut self, subscription: &mut Subscription<OrderEvent>) {
        self.state = FeedState::Draining;
        self.discarded = subscription.drain();
        self.state = FeedState::Closed;
    }
}

/// Forwards this trip's events from `subscription` to `outbound` until the
/// queue is finished or the connection's writer is gone.
pub async fn run_trip_feed(
    mut feed: TripFeed,
    mut subscription: Subscription<OrderEvent>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
) -> TripFeed {
    while let Some(message) = subscription.recv().await {
        match feed.next_action(message) {
            FeedAction::Forward(frame) => {
                if outbound.send(frame).is_err() {
                    debug!(trip_id = feed.trip_id, "Outbound closed, stopping feed");
                    break;
                }
                feed.forwarded += 1;
            }
            FeedAction::Skip => feed.skipped += 1,
            FeedAction::Close => break,
        }
        feed.state = FeedState::Listening;
    }

    feed.close(&mut subscription);
    debug!(
        trip_id = feed.trip_id,
        subscriber = %subscription.id(),
        forwarded = feed.forwarded,
        discarded = feed.discarded,
        "Trip feed closed"
    );
    feed
}
