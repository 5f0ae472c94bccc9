//! Topic-based broadcast hub for room subscriptions.
//!
//! Each topic (e.g. `room:K3F9AB`) owns a Tokio broadcast channel created on the
//! first subscription.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

const CHANNEL_CAPACITY: usize = 128;

#[derive(Clone, Default)]
pub struct WebSocketManager {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `topic`, creating its channel on first use.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<String> {
        let mut channels = self.channels.write().await;
        channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Sends `msg` to every subscriber of `topic`.
    ///
    /// Unknown topics are a no-op. A topic whose last receiver has gone away is
    /// dropped after the send.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) {
        let mut channels = self.channels.write().await;
        let Some(sender) = channels.get(topic) else {
            return;
        };
        let _ = sender.send(msg.into());
        if sender.receiver_count() == 0 {
            tracing::debug!(topic, "Dropping topic without subscribers");
            channels.remove(topic);
        }
    }

    pub async fn has_topic(&self, topic: &str) -> bool {
        self.channels.read().await.contains_key(topic)
    }
}
