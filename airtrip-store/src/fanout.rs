use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

pub type SubscriberId = Uuid;

/// Item delivered to a subscriber queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueMessage<M> {
    Message(M),
    /// Pushed on unregistration so a waiting consumer can stop. Never leaves the process.
    Finish,
}

/// Receiving end of one registered queue.
#[derive(Debug)]
pub struct Subscription<M> {
    id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<QueueMessage<M>>,
}

impl<M> Subscription<M> {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next queued item. `None` once the queue is unregistered and drained.
    pub async fn recv(&mut self) -> Option<QueueMessage<M>> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<QueueMessage<M>> {
        self.receiver.try_recv().ok()
    }

    /// Closes the queue and discards whatever is still buffered. Returns the discarded count.
    pub fn drain(&mut self) -> usize {
        self.receiver.close();
        let mut discarded = 0;
        while self.receiver.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }
}

/// In-process one-to-many delivery over unbounded per-subscriber queues.
///
/// Publishing never blocks and never drops; each subscriber sees messages in
/// publish order. A subscriber registered while a multicast is in flight may
/// miss that message.
#[derive(Debug)]
pub struct FanoutQueue<M> {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::UnboundedSender<QueueMessage<M>>>>,
}

impl<M: Clone + Send + Sync> FanoutQueue<M> {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self) -> Subscription<M> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.subscribers.write().await.insert(id, sender);
        debug!(subscriber = %id, "Fanout subscriber registered");
        Subscription { id, receiver }
    }

    /// Removes the queue and pushes `Finish` onto it. A second call for the
    /// same id is a no-op and returns false.
    pub async fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().await.remove(&id);
        match removed {
            Some(sender) => {
                // Receiver may already be gone; nothing left to notify then
                let _ = sender.send(QueueMessage::Finish);
                debug!(subscriber = %id, "Fanout subscriber unregistered");
                true
            }
            None => false,
        }
    }

    /// Copies `message` onto every registered queue. Returns how many queues
    /// accepted it; queues whose receiver was dropped are pruned.
    pub async fn multicast(&self, message: M) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, sender) in subscribers.iter() {
                if sender.send(QueueMessage::Message(message.clone())).is_ok() {
                    delivered += 1;
                } else {
                    dead.push(*id);
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in dead {
                subscribers.remove(&id);
                debug!(subscriber = %id, "Pruned closed fanout subscriber");
            }
        }

        delivered
    }

    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }
}

impl<M: Clone + Send + Sync> Default for FanoutQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}
