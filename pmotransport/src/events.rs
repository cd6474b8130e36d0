use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Notifications published by the player for its observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// The bound episode changed. `None` once nothing is bound.
    EpisodeChanged { episode_id: Option<String> },
    ProgressChanged {
        episode_id: String,
        elapsed_seconds: u32,
    },
    PlaybackStateChanged { is_playing: bool },
    QueueCleared,
    PlaybackFailed { episode_id: String, reason: String },
}

#[derive(Clone, Default)]
pub struct TransportEventBus {
    subscribers: Arc<Mutex<Vec<Sender<TransportEvent>>>>,
}

impl TransportEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> Receiver<TransportEvent> {
        let (tx, rx) = unbounded::<TransportEvent>();
        {
            let mut subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.push(tx);
        }
        rx
    }

    /// Sends `event` to every live subscriber, dropping the ones whose
    /// receiver is gone.
    pub fn broadcast(&self, event: TransportEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
