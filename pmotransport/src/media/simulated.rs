//! In-process media backend driven by a virtual clock.
//!
//! Nothing is decoded: a track is a position, a duration and a couple of
//! flags. Time only moves when [`SimulatedBackend::advance_clock`] is
//! called, which makes playback deterministic for tests and lets the CLI
//! run faster than real time.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pmoepisodes::Episode;
use tracing::trace;

use crate::errors::MediaError;
use crate::media::capabilities::{MediaBackend, MediaHandle};
use crate::media::subscription::{EventSink, MediaEventKind};

/// Command received by the simulated element, recorded in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaCommand {
    Open(String),
    Play,
    Pause,
    Seek(u32),
    SetLooping(bool),
    Close,
}

#[derive(Debug)]
struct Track {
    episode_id: String,
    duration: u32,
    position: f64,
    playing: bool,
    looping: bool,
    sink: EventSink,
}

#[derive(Debug, Default)]
struct Element {
    /// Bumped on every open; handles from older generations are inert.
    generation: u64,
    track: Option<Track>,
    commands: Vec<MediaCommand>,
}

#[derive(Clone, Debug, Default)]
pub struct SimulatedBackend {
    element: Arc<Mutex<Element>>,
    failing_urls: HashSet<String>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `open` of `url` fail.
    pub fn fail_on(mut self, url: impl Into<String>) -> Self {
        self.failing_urls.insert(url.into());
        self
    }

    fn element(&self) -> MutexGuard<'_, Element> {
        self.element.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lets `elapsed` of media time pass on the loaded track.
    ///
    /// Emits one time update. On reaching the end a looping track wraps
    /// around, otherwise it stops and emits `Ended`.
    pub fn advance_clock(&self, elapsed: Duration) {
        let mut element = self.element();
        let Some(track) = element.track.as_mut() else {
            return;
        };
        if !track.playing {
            return;
        }

        let duration = f64::from(track.duration);
        track.position += elapsed.as_secs_f64();

        if track.position < duration {
            track.sink.emit(MediaEventKind::TimeUpdate {
                position_secs: track.position,
            });
        } else if track.looping {
            track.position = if duration > 0.0 {
                track.position % duration
            } else {
                0.0
            };
            trace!(episode = %track.episode_id, "Simulated track wrapped");
            track.sink.emit(MediaEventKind::TimeUpdate {
                position_secs: track.position,
            });
        } else {
            track.position = duration;
            track.playing = false;
            track.sink.emit(MediaEventKind::TimeUpdate {
                position_secs: track.position,
            });
            track.sink.emit(MediaEventKind::Ended);
        }
    }

    /// Reports an asynchronous failure of the loaded track.
    pub fn fail_current(&self, reason: &str) {
        let mut element = self.element();
        if let Some(track) = element.track.as_mut() {
            track.playing = false;
            track.sink.emit(MediaEventKind::Failed {
                reason: reason.to_string(),
            });
        }
    }

    /// Sink of the loaded track, to inject events by hand.
    pub fn current_sink(&self) -> Option<EventSink> {
        self.element().track.as_ref().map(|track| track.sink.clone())
    }

    pub fn loaded_episode(&self) -> Option<String> {
        self.element()
            .track
            .as_ref()
            .map(|track| track.episode_id.clone())
    }

    pub fn position(&self) -> Option<f64> {
        self.element().track.as_ref().map(|track| track.position)
    }

    pub fn is_playing(&self) -> bool {
        self.element().track.as_ref().is_some_and(|track| track.playing)
    }

    pub fn is_looping(&self) -> bool {
        self.element().track.as_ref().is_some_and(|track| track.looping)
    }

    pub fn commands(&self) -> Vec<MediaCommand> {
        self.element().commands.clone()
    }

    /// Ids passed to `open`, in order, failed attempts included.
    pub fn opened(&self) -> Vec<String> {
        self.element()
            .commands
            .iter()
            .filter_map(|command| match command {
                MediaCommand::Open(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl MediaBackend for SimulatedBackend {
    type Handle = SimulatedHandle;

    fn open(&mut self, episode: &Episode, sink: EventSink) -> Result<SimulatedHandle, MediaError> {
        let mut element = self.element();
        element.generation += 1;
        element.commands.push(MediaCommand::Open(episode.id.clone()));

        if self.failing_urls.contains(&episode.url) {
            element.track = None;
            return Err(MediaError::load(&episode.url, "simulated load failure"));
        }

        element.track = Some(Track {
            episode_id: episode.id.clone(),
            duration: episode.duration,
            position: 0.0,
            playing: false,
            looping: false,
            sink,
        });

        Ok(SimulatedHandle {
            element: Arc::clone(&self.element),
            generation: element.generation,
        })
    }
}

pub struct SimulatedHandle {
    element: Arc<Mutex<Element>>,
    generation: u64,
}

impl SimulatedHandle {
    /// Runs `f` on the track if this handle is still the loaded one.
    fn with_track<F>(&self, command: MediaCommand, f: F) -> Result<(), MediaError>
    where
        F: FnOnce(&mut Track),
    {
        let mut element = self.element.lock().unwrap_or_else(PoisonError::into_inner);
        if element.generation != self.generation {
            return Err(MediaError::Closed);
        }
        element.commands.push(command);
        match element.track.as_mut() {
            Some(track) => {
                f(track);
                Ok(())
            }
            None => Err(MediaError::Closed),
        }
    }
}

impl MediaHandle for SimulatedHandle {
    fn play(&mut self) -> Result<(), MediaError> {
        self.with_track(MediaCommand::Play, |track| {
            track.playing = true;
            track.sink.emit(MediaEventKind::Playing);
        })
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.with_track(MediaCommand::Pause, |track| {
            track.playing = false;
            track.sink.emit(MediaEventKind::Paused);
        })
    }

    fn seek(&mut self, position_secs: u32) -> Result<(), MediaError> {
        self.with_track(MediaCommand::Seek(position_secs), |track| {
            track.position = f64::from(position_secs.min(track.duration));
            track.sink.emit(MediaEventKind::TimeUpdate {
                position_secs: track.position,
            });
        })
    }

    fn set_looping(&mut self, looping: bool) -> Result<(), MediaError> {
        self.with_track(MediaCommand::SetLooping(looping), |track| {
            track.looping = looping;
        })
    }

    fn close(&mut self) {
        let mut element = self.element.lock().unwrap_or_else(PoisonError::into_inner);
        if element.generation == self.generation {
            element.track = None;
            element.commands.push(MediaCommand::Close);
        }
    }
}
