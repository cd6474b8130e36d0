use pmoepisodes::Episode;

use crate::errors::MediaError;
use crate::media::subscription::EventSink;

/// Commands accepted by a live media handle.
///
/// Every command is fire-and-forget: its effect is observed later through
/// the events sent on the handle's [`EventSink`].
pub trait MediaHandle {
    /// Starts or resumes playback.
    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self) -> Result<(), MediaError>;

    /// Moves the playhead to `position_secs`.
    fn seek(&mut self, position_secs: u32) -> Result<(), MediaError>;

    /// Native single-track repeat. A looping handle wraps instead of
    /// emitting `Ended`.
    fn set_looping(&mut self, looping: bool) -> Result<(), MediaError>;

    /// Releases the resource. Commands issued afterwards are ignored.
    fn close(&mut self);
}

/// Factory for media handles.
pub trait MediaBackend {
    type Handle: MediaHandle;

    /// Loads `episode` and returns a paused handle reporting on `sink`.
    fn open(&mut self, episode: &Episode, sink: EventSink) -> Result<Self::Handle, MediaError>;
}
