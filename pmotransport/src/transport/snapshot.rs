use pmoepisodes::Episode;
use serde::Serialize;

/// Read-only view of the transport at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransportSnapshot {
    pub queue: Vec<Episode>,
    /// `None` when the queue is empty.
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub has_next: bool,
    pub has_previous: bool,
    /// Whole seconds into the bound episode, when one is bound.
    pub elapsed_seconds: Option<u32>,
}

impl TransportSnapshot {
    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_index.and_then(|idx| self.queue.get(idx))
    }

    pub fn has_episode(&self) -> bool {
        self.current_index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::transport::TransportStore;

    #[test]
    fn test_empty_snapshot_serializes_without_current_index() {
        let snapshot = TransportStore::with_seed(1).snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json["current_index"].is_null());
        assert_eq!(json["has_next"], serde_json::Value::Bool(false));
        assert_eq!(json["queue"].as_array().map(Vec::len), Some(0));
    }
}
