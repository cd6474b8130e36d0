//! The player session: a transport store and its media binder, driven as
//! one unit.

use crossbeam_channel::Receiver;
use pmoepisodes::Episode;
use tracing::debug;

use crate::errors::Result;
use crate::events::{TransportEvent, TransportEventBus};
use crate::media::{MediaBackend, MediaBinder};
use crate::transport::{TransportSnapshot, TransportStore};

/// Owns the transport state and the media binding for one session.
///
/// Every action mutates the store and then reconciles the media handle, so
/// callers never have to sync by hand. Media events are applied by
/// [`PodcastPlayer::pump`].
pub struct PodcastPlayer<B: MediaBackend> {
    store: TransportStore,
    binder: MediaBinder<B>,
    bus: TransportEventBus,
}

impl<B: MediaBackend> PodcastPlayer<B> {
    pub fn new(backend: B) -> Self {
        Self::with_store(backend, TransportStore::new())
    }

    pub fn with_store(backend: B, mut store: TransportStore) -> Self {
        let bus = TransportEventBus::new();
        let mut binder = MediaBinder::new(backend, bus.clone());
        binder.sync(&mut store);
        Self { store, binder, bus }
    }

    pub fn subscribe(&self) -> Receiver<TransportEvent> {
        self.bus.subscribe()
    }

    pub fn store(&self) -> &TransportStore {
        &self.store
    }

    pub fn binder(&self) -> &MediaBinder<B> {
        &self.binder
    }

    pub fn backend(&self) -> &B {
        self.binder.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.binder.backend_mut()
    }

    pub fn elapsed_seconds(&self) -> Option<u32> {
        self.binder.elapsed_seconds()
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        let mut snapshot = self.store.snapshot();
        snapshot.elapsed_seconds = self.binder.elapsed_seconds();
        snapshot
    }

    pub fn play_single(&mut self, episode: Episode) {
        self.apply(|store| store.play_single(episode))
    }

    pub fn play_queue(&mut self, episodes: Vec<Episode>, start_index: usize) -> Result<()> {
        self.apply(|store| store.play_queue(episodes, start_index))
    }

    pub fn toggle_play(&mut self) {
        self.apply(TransportStore::toggle_play)
    }

    pub fn toggle_loop(&mut self) {
        self.apply(TransportStore::toggle_loop)
    }

    pub fn toggle_shuffle(&mut self) {
        self.apply(TransportStore::toggle_shuffle)
    }

    pub fn set_playing_state(&mut self, state: bool) {
        self.apply(|store| store.set_playing_state(state))
    }

    pub fn next(&mut self) {
        self.apply(TransportStore::advance)
    }

    pub fn previous(&mut self) {
        self.apply(TransportStore::retreat)
    }

    pub fn clear(&mut self) {
        let was_empty = self.store.is_empty();
        self.apply(TransportStore::clear);
        if !was_empty {
            self.bus.broadcast(TransportEvent::QueueCleared);
        }
    }

    /// Seeks the current episode. Returns the applied position, `None`
    /// when nothing is playing.
    pub fn seek(&mut self, position_secs: u32) -> Result<Option<u32>> {
        Ok(self.binder.seek(position_secs)?)
    }

    /// Applies every pending media event in arrival order and returns how
    /// many were accepted.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.binder.try_next_event() {
            let was_playing = self.store.is_playing();
            if self.binder.handle_event(&mut self.store, event) {
                applied += 1;
            }
            self.notify_playing(was_playing);
        }
        if applied > 0 {
            debug!(applied, "Media events applied");
        }
        applied
    }

    fn apply<R>(&mut self, action: impl FnOnce(&mut TransportStore) -> R) -> R {
        let was_playing = self.store.is_playing();
        let result = action(&mut self.store);
        self.binder.sync(&mut self.store);
        self.notify_playing(was_playing);
        result
    }

    fn notify_playing(&self, was_playing: bool) {
        if self.store.is_playing() != was_playing {
            self.bus.broadcast(TransportEvent::PlaybackStateChanged {
                is_playing: self.store.is_playing(),
            });
        }
    }
}
