//! Play queue and transport flags.
//!
//! `TransportStore` is the single source of truth for what is queued, which
//! episode is current and whether playback is running, looping or
//! shuffling. Its fields are private: the action methods below are the only
//! mutation surface. Actions that need a current episode are silent no-ops
//! on an empty queue, so callers only have to consult the derived booleans
//! to decide which controls to enable.

use pmoepisodes::Episode;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::errors::{Result, TransportError};
use crate::transport::snapshot::TransportSnapshot;

#[derive(Debug, Clone)]
pub struct TransportStore {
    queue: Vec<Episode>,
    /// Always 0 when the queue is empty.
    current_index: usize,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
    rng: SmallRng,
}

impl Default for TransportStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportStore {
    /// Creates an empty store with every flag cleared.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Creates an empty store drawing shuffle picks from `rng`.
    pub fn with_rng(rng: SmallRng) -> Self {
        Self {
            queue: Vec::new(),
            current_index: 0,
            is_playing: false,
            is_looping: false,
            is_shuffling: false,
            rng,
        }
    }

    /// Creates an empty store with a deterministic shuffle sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    // --- Readers -----------------------------------------------------------

    pub fn queue(&self) -> &[Episode] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Position of the current episode, `None` when the queue is empty.
    pub fn current_index(&self) -> Option<usize> {
        if self.queue.is_empty() {
            None
        } else {
            Some(self.current_index)
        }
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.queue.get(self.current_index)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    pub fn has_previous(&self) -> bool {
        self.current_index > 0
    }

    /// True when `advance` would move somewhere.
    ///
    /// While shuffling any non-empty queue has a next pick.
    pub fn has_next(&self) -> bool {
        !self.queue.is_empty()
            && (self.is_shuffling || self.current_index + 1 < self.queue.len())
    }

    /// Copy of the observable state. Progress is not tracked here and is
    /// left unset.
    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            queue: self.queue.clone(),
            current_index: self.current_index(),
            is_playing: self.is_playing,
            is_looping: self.is_looping,
            is_shuffling: self.is_shuffling,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
            elapsed_seconds: None,
        }
    }

    // --- Queue entry points ------------------------------------------------

    /// Replaces the queue with a single episode and starts playback.
    pub fn play_single(&mut self, episode: Episode) {
        debug!(episode = %episode.id, "Playing single episode");
        self.queue = vec![episode];
        self.current_index = 0;
        self.is_playing = true;
    }

    /// Replaces the queue with `episodes` positioned at `start_index` and
    /// starts playback.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `episodes` is empty or `start_index` is
    /// out of range; the store is left untouched in that case.
    pub fn play_queue(&mut self, episodes: Vec<Episode>, start_index: usize) -> Result<()> {
        if episodes.is_empty() {
            return Err(TransportError::invalid_argument(
                "cannot play an empty episode list",
            ));
        }
        if start_index >= episodes.len() {
            return Err(TransportError::invalid_argument(format!(
                "start index {} out of range for {} episode(s)",
                start_index,
                episodes.len()
            )));
        }

        debug!(len = episodes.len(), index = start_index, "Replacing play queue");
        self.queue = episodes;
        self.current_index = start_index;
        self.is_playing = true;
        Ok(())
    }

    // --- Flags -------------------------------------------------------------

    pub fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
    }

    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
    }

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffling = !self.is_shuffling;
    }

    /// Mirrors a play/pause transition reported by the media element.
    pub fn set_playing_state(&mut self, state: bool) {
        self.is_playing = state;
    }

    // --- Navigation --------------------------------------------------------

    /// Moves to the next episode.
    ///
    /// In shuffle mode the next position is drawn uniformly from the whole
    /// queue and may be the current one. Otherwise this is a no-op on the
    /// last episode. Never touches `is_playing`.
    pub fn advance(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        if self.is_shuffling {
            self.current_index = self.rng.random_range(0..self.queue.len());
            debug!(index = self.current_index, "Shuffle picked next episode");
        } else if self.has_next() {
            self.current_index += 1;
            debug!(index = self.current_index, "Advanced to next episode");
        }
    }

    /// Moves back one episode; no-op at the head of the queue.
    pub fn retreat(&mut self) {
        if self.has_previous() {
            self.current_index -= 1;
            debug!(index = self.current_index, "Moved to previous episode");
        }
    }

    /// Empties the queue. Flags are kept.
    pub fn clear(&mut self) {
        if !self.queue.is_empty() {
            debug!("Clearing play queue");
        }
        self.queue.clear();
        self.current_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: &str, duration: u32) -> Episode {
        Episode::new(id, format!("https://example.org/{id}.mp3"), duration)
    }

    fn three() -> Vec<Episode> {
        vec![episode("a", 120), episode("b", 90), episode("c", 30)]
    }

    #[test]
    fn test_new_store_is_empty_and_idle() {
        let store = TransportStore::new();
        assert!(store.is_empty());
        assert_eq!(store.current_index(), None);
        assert_eq!(store.current_episode(), None);
        assert!(!store.is_playing());
        assert!(!store.is_looping());
        assert!(!store.is_shuffling());
        assert!(!store.has_next());
        assert!(!store.has_previous());
    }

    #[test]
    fn test_play_queue_sets_position_and_plays() {
        for start in 0..3 {
            let mut store = TransportStore::with_seed(1);
            store.play_queue(three(), start).unwrap();
            assert_eq!(store.current_index(), Some(start));
            assert!(store.is_playing());
        }
    }

    #[test]
    fn test_play_queue_rejects_bad_arguments_without_side_effects() {
        let mut store = TransportStore::with_seed(1);
        store.play_single(episode("x", 10));
        store.toggle_play();

        let err = store.play_queue(Vec::new(), 0).unwrap_err();
        assert!(matches!(err, TransportError::InvalidArgument(_)));
        let err = store.play_queue(three(), 3).unwrap_err();
        assert!(matches!(err, TransportError::InvalidArgument(_)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.current_episode().map(|e| e.id.as_str()), Some("x"));
        assert!(!store.is_playing());
    }

    #[test]
    fn test_play_single_replaces_queue() {
        let mut store = TransportStore::with_seed(1);
        store.play_queue(three(), 2).unwrap();
        store.set_playing_state(false);

        store.play_single(episode("d", 45));
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_index(), Some(0));
        assert!(store.is_playing());
    }

    #[test]
    fn test_advance_stops_at_last_episode() {
        let mut store = TransportStore::with_seed(1);
        store.play_queue(three(), 0).unwrap();

        store.advance();
        store.advance();
        assert_eq!(store.current_index(), Some(2));
        assert!(!store.has_next());

        store.advance();
        assert_eq!(store.current_index(), Some(2));
    }

    #[test]
    fn test_retreat_stops_at_first_episode() {
        let mut store = TransportStore::with_seed(1);
        store.play_queue(three(), 1).unwrap();

        store.retreat();
        assert_eq!(store.current_index(), Some(0));
        assert!(!store.has_previous());

        store.retreat();
        assert_eq!(store.current_index(), Some(0));
    }

    #[test]
    fn test_advance_does_not_touch_playing_flag() {
        let mut store = TransportStore::with_seed(1);
        store.play_queue(three(), 0).unwrap();
        store.set_playing_state(false);
        store.advance();
        assert!(!store.is_playing());
    }

    #[test]
    fn test_has_next_uses_strict_bound() {
        let mut store = TransportStore::with_seed(1);
        store.play_queue(vec![episode("a", 1), episode("b", 1)], 1).unwrap();
        assert!(!store.has_next());
    }

    #[test]
    fn test_shuffle_has_next_only_with_episodes() {
        let mut store = TransportStore::with_seed(1);
        store.toggle_shuffle();
        assert!(!store.has_next());

        store.play_single(episode("a", 1));
        assert!(store.has_next());
    }

    #[test]
    fn test_shuffle_single_episode_always_lands_on_zero() {
        let mut store = TransportStore::with_seed(42);
        store.play_single(episode("a", 1));
        store.toggle_shuffle();
        for _ in 0..50 {
            store.advance();
            assert_eq!(store.current_index(), Some(0));
        }
    }

    #[test]
    fn test_shuffle_stays_in_range_and_reaches_every_index() {
        let mut store = TransportStore::with_seed(7);
        store.play_queue(three(), 0).unwrap();
        store.toggle_shuffle();

        let mut seen = [false; 3];
        for _ in 0..200 {
            store.advance();
            let idx = store.current_index().unwrap();
            assert!(idx < 3);
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_clear_is_idempotent_and_keeps_flags() {
        let mut store = TransportStore::with_seed(1);
        store.play_queue(three(), 2).unwrap();
        store.toggle_loop();
        store.toggle_shuffle();

        store.clear();
        let once = store.snapshot();
        store.clear();
        let twice = store.snapshot();

        assert_eq!(once, twice);
        assert!(store.queue().is_empty());
        assert_eq!(store.current_index(), None);
        assert!(!store.has_previous());
        assert!(store.is_playing());
        assert!(store.is_looping());
        assert!(store.is_shuffling());
    }

    #[test]
    fn test_actions_on_empty_queue_are_noops() {
        let mut store = TransportStore::with_seed(1);
        store.advance();
        store.retreat();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.current_index(), None);

        store.toggle_shuffle();
        store.advance();
        assert_eq!(store.current_index(), None);

        store.toggle_play();
        assert!(store.is_playing());
    }
}
