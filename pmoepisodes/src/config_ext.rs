//! pmoconfig extension for episode repositories

use std::time::Duration;

use crate::repository::HttpEpisodeRepository;

/// Extension trait for pmoconfig::Config
pub trait EpisodesConfigExt {
    /// Builds the HTTP repository described by the `episodes` section.
    fn episode_repository(&self) -> anyhow::Result<HttpEpisodeRepository>;
}

impl EpisodesConfigExt for pmoconfig::Config {
    fn episode_repository(&self) -> anyhow::Result<HttpEpisodeRepository> {
        let repository = HttpEpisodeRepository::new(self.get_episodes_api_url()?)
            .with_limit(self.get_episodes_limit()?)
            .with_timeout(Duration::from_secs(self.get_episodes_timeout_secs()?));
        Ok(repository)
    }
}
