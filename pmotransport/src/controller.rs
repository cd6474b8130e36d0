//! Control surface for a rendering layer.
//!
//! [`ControlsState`] says which controls are enabled and what to display;
//! [`TransportController`] turns user intents into player actions. Neither
//! keeps state of its own.

use pmoepisodes::Episode;
use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::media::MediaBackend;
use crate::player::PodcastPlayer;
use crate::time_utils::format_hhmmss;
use crate::transport::TransportSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControlsState {
    pub has_episode: bool,
    pub can_toggle_play: bool,
    pub can_previous: bool,
    pub can_next: bool,
    /// Shuffling a single episode is pointless, so it needs two.
    pub can_shuffle: bool,
    pub can_loop: bool,
    pub can_seek: bool,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub title: Option<String>,
    pub members: Option<String>,
    pub thumbnail: Option<String>,
    pub elapsed_seconds: u32,
    pub duration_seconds: u32,
    pub elapsed_label: String,
    pub duration_label: String,
}

impl ControlsState {
    pub fn from_snapshot(snapshot: &TransportSnapshot) -> Self {
        let episode = snapshot.current_episode();
        let has_episode = episode.is_some();
        let duration_seconds = episode.map(|e| e.duration).unwrap_or(0);
        let elapsed_seconds = snapshot
            .elapsed_seconds
            .unwrap_or(0)
            .min(duration_seconds);

        Self {
            has_episode,
            can_toggle_play: has_episode,
            can_previous: has_episode && snapshot.has_previous,
            can_next: has_episode && snapshot.has_next,
            can_shuffle: has_episode && snapshot.queue.len() > 1,
            can_loop: has_episode,
            can_seek: has_episode,
            is_playing: snapshot.is_playing,
            is_looping: snapshot.is_looping,
            is_shuffling: snapshot.is_shuffling,
            title: episode.map(|e| e.title.clone()),
            members: episode.map(|e| e.members.clone()),
            thumbnail: episode.map(|e| e.thumbnail.clone()),
            elapsed_seconds,
            duration_seconds,
            elapsed_label: format_hhmmss(elapsed_seconds),
            duration_label: format_hhmmss(duration_seconds),
        }
    }
}

/// A user gesture on the player controls or an episode list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportIntent {
    TogglePlay,
    Previous,
    Next,
    ToggleShuffle,
    ToggleLoop,
    /// Drag of the progress slider, in seconds.
    Seek(u32),
    PlayEpisode(Episode),
    PlayList { episodes: Vec<Episode>, index: usize },
}

pub struct TransportController<'a, B: MediaBackend> {
    player: &'a mut PodcastPlayer<B>,
}

impl<'a, B: MediaBackend> TransportController<'a, B> {
    pub fn new(player: &'a mut PodcastPlayer<B>) -> Self {
        Self { player }
    }

    pub fn controls(&self) -> ControlsState {
        ControlsState::from_snapshot(&self.player.snapshot())
    }

    pub fn player(&self) -> &PodcastPlayer<B> {
        &*self.player
    }

    pub fn player_mut(&mut self) -> &mut PodcastPlayer<B> {
        &mut *self.player
    }

    /// Dispatches `intent` unless its control is disabled.
    ///
    /// Returns `Ok(false)` for a dropped intent. Only `PlayList` with an
    /// empty list or a bad index reports an error.
    pub fn dispatch(&mut self, intent: TransportIntent) -> Result<bool> {
        let controls = self.controls();
        let enabled = match &intent {
            TransportIntent::TogglePlay => controls.can_toggle_play,
            TransportIntent::Previous => controls.can_previous,
            TransportIntent::Next => controls.can_next,
            TransportIntent::ToggleShuffle => controls.can_shuffle,
            TransportIntent::ToggleLoop => controls.can_loop,
            TransportIntent::Seek(_) => controls.can_seek,
            TransportIntent::PlayEpisode(_) | TransportIntent::PlayList { .. } => true,
        };
        if !enabled {
            debug!(intent = ?intent, "Control disabled, intent dropped");
            return Ok(false);
        }

        match intent {
            TransportIntent::TogglePlay => self.player.toggle_play(),
            TransportIntent::Previous => self.player.previous(),
            TransportIntent::Next => self.player.next(),
            TransportIntent::ToggleShuffle => self.player.toggle_shuffle(),
            TransportIntent::ToggleLoop => self.player.toggle_loop(),
            TransportIntent::Seek(position) => {
                self.player.seek(position)?;
            }
            TransportIntent::PlayEpisode(episode) => self.player.play_single(episode),
            TransportIntent::PlayList { episodes, index } => {
                self.player.play_queue(episodes, index)?
            }
        }
        Ok(true)
    }
}
