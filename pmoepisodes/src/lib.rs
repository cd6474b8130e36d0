//! # pmoepisodes - Podcast episode records for PMOPodcast
//!
//! This crate supplies normalized [`Episode`] values to the transport layer:
//! - The immutable `Episode` value consumed by the play queue
//! - The raw JSON record shape served by the episodes API
//! - An [`EpisodeRepository`] abstraction with HTTP and JSON-file implementations
//!
//! # Example
//!
//! ```no_run
//! use pmoepisodes::{EpisodeRepository, HttpEpisodeRepository};
//!
//! # fn main() -> pmoepisodes::Result<()> {
//! let repository = HttpEpisodeRepository::new("http://localhost:3333/episodes");
//! for episode in repository.list_episodes()? {
//!     println!("{} ({}s)", episode.title, episode.duration);
//! }
//! # Ok(())
//! # }
//! ```

mod episode;
mod error;
mod repository;

#[cfg(feature = "pmoconfig")]
mod config_ext;

pub use episode::{Episode, EpisodeFile, EpisodeRecord};
pub use error::{RepositoryError, Result};
pub use repository::{
    EpisodeRepository, HttpEpisodeRepository, JsonFileEpisodeRepository, normalize_records,
};

#[cfg(feature = "pmoconfig")]
pub use config_ext::EpisodesConfigExt;
