//! # pmotransport - Audio transport for the podcast player
//!
//! This crate holds the playback logic of PMOPodcast: a play queue with its
//! transport flags, the binding of that state to a playable media element,
//! and the control surface a rendering layer drives.
//!
//! ## Layout
//!
//! - [`transport`]: [`TransportStore`], the queue, current position and
//!   play/loop/shuffle flags, with the derived `has_next` / `has_previous`
//! - [`media`]: the [`MediaBackend`] / [`MediaHandle`] seam, the
//!   [`MediaBinder`] and an in-process [`SimulatedBackend`]
//! - [`player`]: [`PodcastPlayer`], store and binder driven together
//! - [`controller`]: enabled/disabled controls and intent dispatch
//! - [`events`]: notifications broadcast to observers
//!
//! ## Example
//!
//! ```
//! use pmotransport::{Episode, PodcastPlayer, SimulatedBackend};
//! use std::time::Duration;
//!
//! let mut player = PodcastPlayer::new(SimulatedBackend::new());
//! player
//!     .play_queue(
//!         vec![
//!             Episode::new("a", "https://example.org/a.mp3", 120),
//!             Episode::new("b", "https://example.org/b.mp3", 90),
//!         ],
//!         0,
//!     )
//!     .unwrap();
//!
//! player.backend().advance_clock(Duration::from_secs(3));
//! player.pump();
//! assert_eq!(player.elapsed_seconds(), Some(3));
//! assert!(player.store().has_next());
//! ```

pub mod controller;
pub mod errors;
pub mod events;
pub mod media;
pub mod player;
pub mod time_utils;
pub mod transport;

#[cfg(feature = "pmoconfig")]
pub mod config_ext;

pub use controller::{ControlsState, TransportController, TransportIntent};
pub use errors::{MediaError, Result, TransportError};
pub use events::{TransportEvent, TransportEventBus};
pub use media::{
    MediaBackend, MediaBinder, MediaCommand, MediaEvent, MediaEventKind, MediaHandle,
    SimulatedBackend, SubscriptionId,
};
pub use player::PodcastPlayer;
pub use pmoepisodes::Episode;
pub use transport::{TransportSnapshot, TransportStore};

#[cfg(feature = "pmoconfig")]
pub use config_ext::{TransportConfigExt, TransportDefaults};
