use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, warn};
use ureq::Agent;

use crate::episode::{Episode, EpisodeRecord};
use crate::error::Result;

const DEFAULT_LIMIT: usize = 12;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Characters escaped when an episode id is used as a path segment.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Source of episode records for the pages.
pub trait EpisodeRepository {
    /// Latest episodes, most recent first.
    fn list_episodes(&self) -> Result<Vec<Episode>>;

    /// Looks an episode up by id.
    fn find_episode(&self, id: &str) -> Result<Option<Episode>> {
        Ok(self
            .list_episodes()?
            .into_iter()
            .find(|episode| episode.id == id))
    }
}

/// Converts raw records into episodes, dropping the ones that cannot be played.
pub fn normalize_records(records: Vec<EpisodeRecord>) -> Vec<Episode> {
    records
        .into_iter()
        .filter_map(|record| match Episode::try_from(record) {
            Ok(episode) => Some(episode),
            Err(err) => {
                warn!(error = %err, "Skipping episode record");
                None
            }
        })
        .collect()
}

fn read_records<R: Read>(reader: R) -> Result<Vec<EpisodeRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Episodes served by a JSON REST API (`GET {api_url}` and `GET {api_url}/{id}`).
#[derive(Clone, Debug)]
pub struct HttpEpisodeRepository {
    api_url: String,
    limit: usize,
    timeout: Duration,
}

impl HttpEpisodeRepository {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            limit: DEFAULT_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `{api_url}/{id}` with the id percent-encoded.
    pub fn episode_url(&self, id: &str) -> String {
        format!("{}/{}", self.api_url, utf8_percent_encode(id, ID_SEGMENT))
    }

    fn agent(&self) -> Agent {
        Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into()
    }
}

impl EpisodeRepository for HttpEpisodeRepository {
    fn list_episodes(&self) -> Result<Vec<Episode>> {
        debug!(url = %self.api_url, limit = self.limit, "Fetching episodes");

        let response = self
            .agent()
            .get(&self.api_url)
            .query("_limit", self.limit.to_string())
            .query("_sort", "published_at")
            .query("_order", "desc")
            .call()?;

        let (_parts, body) = response.into_parts();
        let records = read_records(body.into_reader())?;
        let episodes = normalize_records(records);

        debug!(count = episodes.len(), "Fetched episodes");
        Ok(episodes)
    }

    fn find_episode(&self, id: &str) -> Result<Option<Episode>> {
        let url = self.episode_url(id);
        debug!(url = %url, "Fetching episode");

        let response = match self.agent().get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(404)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let (_parts, body) = response.into_parts();
        let record: EpisodeRecord = serde_json::from_reader(body.into_reader())?;
        Episode::try_from(record).map(Some)
    }
}

/// Episodes read from a JSON file holding the same array the API serves.
#[derive(Clone, Debug)]
pub struct JsonFileEpisodeRepository {
    path: PathBuf,
}

impl JsonFileEpisodeRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl EpisodeRepository for JsonFileEpisodeRepository {
    fn list_episodes(&self) -> Result<Vec<Episode>> {
        debug!(path = %self.path.display(), "Reading episodes file");
        let file = File::open(&self.path)?;
        let records = read_records(BufReader::new(file))?;
        Ok(normalize_records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_skips_invalid_records() {
        let records: Vec<EpisodeRecord> = serde_json::from_str(
            r#"[
                {"id":"a","title":"A","file":{"url":"https://example.org/a.mp3","duration":120}},
                {"id":"bad","title":"Bad","file":{"url":"https://example.org/b.mp3","duration":-5}},
                {"id":"c","title":"C","file":{"url":"https://example.org/c.mp3","duration":30}}
            ]"#,
        )
        .unwrap();

        let episodes = normalize_records(records);
        let ids: Vec<_> = episodes.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_episode_url_escapes_reserved_characters() {
        let repository = HttpEpisodeRepository::new("http://localhost:3333/episodes");
        assert_eq!(
            repository.episode_url("a-importancia_da.v2"),
            "http://localhost:3333/episodes/a-importancia_da.v2"
        );
        assert_eq!(
            repository.episode_url("a/b?c#d e"),
            "http://localhost:3333/episodes/a%2Fb%3Fc%23d%20e"
        );
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let repository = HttpEpisodeRepository::new("http://localhost:3333/episodes/");
        assert_eq!(repository.api_url(), "http://localhost:3333/episodes");
    }
}
