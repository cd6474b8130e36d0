//! Binds the transport state to a live media handle.
//!
//! The binder owns exactly one subscription slot. Whenever the identity of
//! the current episode changes the slot is torn down (handle closed, sink
//! cut off) before a new handle is opened, and every incoming media event
//! is checked against the live subscription id so a late event from a
//! superseded handle is dropped.

use crossbeam_channel::{Receiver, Sender, unbounded};
use pmoepisodes::Episode;
use tracing::{debug, info, warn};

use crate::errors::MediaError;
use crate::events::{TransportEvent, TransportEventBus};
use crate::media::capabilities::{MediaBackend, MediaHandle};
use crate::media::subscription::{MediaEvent, MediaEventKind, Subscription, SubscriptionId};
use crate::time_utils::floor_position;
use crate::transport::TransportStore;

struct Binding<H> {
    episode: Episode,
    handle: H,
    subscription: Subscription,
    elapsed: u32,
    /// Last play state commanded to, or reported by, the handle.
    playing: bool,
    /// Last loop flag forwarded to the handle.
    looping: bool,
}

pub struct MediaBinder<B: MediaBackend> {
    backend: B,
    slot: Option<Binding<B::Handle>>,
    next_subscription: u64,
    events_tx: Sender<MediaEvent>,
    events_rx: Receiver<MediaEvent>,
    bus: TransportEventBus,
}

impl<B: MediaBackend> MediaBinder<B> {
    pub fn new(backend: B, bus: TransportEventBus) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            backend,
            slot: None,
            next_subscription: 1,
            events_tx,
            events_rx,
            bus,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn bound_episode(&self) -> Option<&Episode> {
        self.slot.as_ref().map(|binding| &binding.episode)
    }

    /// Elapsed whole seconds of the bound episode.
    pub fn elapsed_seconds(&self) -> Option<u32> {
        self.slot.as_ref().map(|binding| binding.elapsed)
    }

    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.slot.as_ref().map(|binding| binding.subscription.id())
    }

    /// Reconciles the media handle with `store`.
    ///
    /// Rebinds only when the current episode id differs from the bound one,
    /// then forwards the loop flag and play/pause transitions. A handle that
    /// cannot be opened or started is handled like a playback failure; at
    /// most one attempt per queued episode is made in a single call.
    pub fn sync(&mut self, store: &mut TransportStore) {
        let mut attempts = 0usize;

        loop {
            let Some(target) = store.current_episode().cloned() else {
                self.unbind();
                return;
            };

            let bound = self
                .slot
                .as_ref()
                .is_some_and(|binding| binding.episode.id == target.id);

            let outcome = if bound {
                self.apply_flags(store)
            } else {
                self.release();
                self.bind(target.clone())
                    .and_then(|_| self.apply_flags(store))
            };

            let Err(err) = outcome else {
                return;
            };

            attempts += 1;
            self.report_failure(&target.id, &err.to_string());
            self.release();

            if store.has_next() && attempts < store.len() {
                store.advance();
            } else {
                self.drop_queue(store, true);
                return;
            }
        }
    }

    /// Seeks the bound episode to `position_secs`, clamped to its duration,
    /// and republishes the new position at once.
    ///
    /// Returns the applied position, or `None` when nothing is bound.
    pub fn seek(&mut self, position_secs: u32) -> Result<Option<u32>, MediaError> {
        let Some(binding) = self.slot.as_mut() else {
            debug!(position_secs, "Seek ignored, no episode bound");
            return Ok(None);
        };

        let target = position_secs.min(binding.episode.duration);
        binding.handle.seek(target)?;
        binding.elapsed = target;

        debug!(episode = %binding.episode.id, elapsed = target, "Seeked");
        self.bus.broadcast(TransportEvent::ProgressChanged {
            episode_id: binding.episode.id.clone(),
            elapsed_seconds: target,
        });
        Ok(Some(target))
    }

    /// Next queued media event, if any.
    pub fn try_next_event(&self) -> Option<MediaEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Applies one media event to `store`.
    ///
    /// Returns `false` when the event belongs to a superseded subscription
    /// and was ignored.
    pub fn handle_event(&mut self, store: &mut TransportStore, event: MediaEvent) -> bool {
        let Some(binding) = self.slot.as_mut() else {
            debug!(subscription = %event.subscription, "Ignoring media event, nothing bound");
            return false;
        };
        if binding.subscription.id() != event.subscription {
            debug!(
                subscription = %event.subscription,
                live = %binding.subscription.id(),
                "Ignoring stale media event"
            );
            return false;
        }

        match event.kind {
            MediaEventKind::TimeUpdate { position_secs } => {
                binding.elapsed = floor_position(position_secs, binding.episode.duration);
                self.bus.broadcast(TransportEvent::ProgressChanged {
                    episode_id: binding.episode.id.clone(),
                    elapsed_seconds: binding.elapsed,
                });
            }
            MediaEventKind::Playing => {
                binding.playing = true;
                store.set_playing_state(true);
            }
            MediaEventKind::Paused => {
                binding.playing = false;
                store.set_playing_state(false);
            }
            MediaEventKind::Ended => self.on_ended(store),
            MediaEventKind::Failed { reason } => self.on_failed(store, &reason),
        }
        true
    }

    fn on_ended(&mut self, store: &mut TransportStore) {
        if store.is_looping() {
            debug!("End of track while looping, ignored");
            return;
        }

        let finished = self.bound_episode().map(|episode| episode.id.clone());
        info!(episode = ?finished, "End of track");

        if store.has_next() {
            store.advance();
            // Shuffle may pick the episode that just ended: start it over on
            // a fresh handle.
            if store.current_episode().map(|episode| &episode.id) == finished.as_ref() {
                self.release();
            }
            self.sync(store);
        } else {
            self.drop_queue(store, false);
        }
    }

    fn on_failed(&mut self, store: &mut TransportStore, reason: &str) {
        if let Some(episode_id) = self.bound_episode().map(|episode| episode.id.clone()) {
            self.report_failure(&episode_id, reason);
        }
        self.release();

        if store.has_next() {
            store.advance();
            self.sync(store);
        } else {
            self.drop_queue(store, true);
        }
    }

    fn bind(&mut self, episode: Episode) -> Result<(), MediaError> {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        let (subscription, sink) = Subscription::new(id, self.events_tx.clone());
        let handle = self.backend.open(&episode, sink)?;

        info!(episode = %episode.id, subscription = %id, "Bound media handle");
        self.bus.broadcast(TransportEvent::EpisodeChanged {
            episode_id: Some(episode.id.clone()),
        });
        self.bus.broadcast(TransportEvent::ProgressChanged {
            episode_id: episode.id.clone(),
            elapsed_seconds: 0,
        });

        self.slot = Some(Binding {
            episode,
            handle,
            subscription,
            elapsed: 0,
            playing: false,
            looping: false,
        });
        Ok(())
    }

    fn apply_flags(&mut self, store: &TransportStore) -> Result<(), MediaError> {
        let Some(binding) = self.slot.as_mut() else {
            return Ok(());
        };

        if binding.looping != store.is_looping() {
            match binding.handle.set_looping(store.is_looping()) {
                Ok(()) => binding.looping = store.is_looping(),
                Err(err) => warn!(error = %err, "Cannot forward loop flag"),
            }
        }

        if binding.playing != store.is_playing() {
            if store.is_playing() {
                binding.handle.play()?;
            } else if let Err(err) = binding.handle.pause() {
                warn!(error = %err, "Pause command failed");
            }
            binding.playing = store.is_playing();
        }
        Ok(())
    }

    /// Closes the slot without notifying observers.
    fn release(&mut self) -> bool {
        match self.slot.take() {
            Some(mut binding) => {
                binding.subscription.close();
                binding.handle.close();
                debug!(
                    episode = %binding.episode.id,
                    subscription = %binding.subscription.id(),
                    "Released media handle"
                );
                true
            }
            None => false,
        }
    }

    fn unbind(&mut self) {
        if self.release() {
            self.bus
                .broadcast(TransportEvent::EpisodeChanged { episode_id: None });
        }
    }

    fn drop_queue(&mut self, store: &mut TransportStore, stop: bool) {
        store.clear();
        if stop {
            store.set_playing_state(false);
        }
        self.release();
        self.bus.broadcast(TransportEvent::QueueCleared);
        self.bus
            .broadcast(TransportEvent::EpisodeChanged { episode_id: None });
    }

    fn report_failure(&self, episode_id: &str, reason: &str) {
        warn!(episode = %episode_id, reason = %reason, "Playback failed");
        self.bus.broadcast(TransportEvent::PlaybackFailed {
            episode_id: episode_id.to_string(),
            reason: reason.to_string(),
        });
    }
}
