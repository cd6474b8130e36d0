use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

/// A playable podcast episode.
///
/// Episodes are produced by a repository and never mutated by the
/// transport layer. Identity is carried by `id`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub title: String,
    /// Display string of the participants.
    pub members: String,
    pub thumbnail: String,
    /// Length in whole seconds.
    pub duration: u32,
    /// Playable media URI.
    pub url: String,
}

impl Episode {
    pub fn new(id: impl Into<String>, url: impl Into<String>, duration: u32) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            members: String::new(),
            thumbnail: String::new(),
            duration,
            url: url.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_members(mut self, members: impl Into<String>) -> Self {
        self.members = members.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }
}

/// Raw episode record as served by the episodes API.
#[derive(Clone, Debug, Deserialize)]
pub struct EpisodeRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub members: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub description: Option<String>,
    pub file: EpisodeFile,
}

/// Media file descriptor nested in an [`EpisodeRecord`].
#[derive(Clone, Debug, Deserialize)]
pub struct EpisodeFile {
    pub url: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
}

impl TryFrom<EpisodeRecord> for Episode {
    type Error = RepositoryError;

    fn try_from(record: EpisodeRecord) -> Result<Self, Self::Error> {
        let duration = match record.file.duration {
            None => return Err(RepositoryError::invalid_record(&record.id, "missing duration")),
            Some(d) if d < 0 => {
                return Err(RepositoryError::invalid_record(
                    &record.id,
                    format!("negative duration {d}"),
                ));
            }
            Some(d) => u32::try_from(d).map_err(|_| {
                RepositoryError::invalid_record(&record.id, format!("duration {d} out of range"))
            })?,
        };

        if record.file.url.trim().is_empty() {
            return Err(RepositoryError::invalid_record(&record.id, "empty media url"));
        }

        Ok(Episode {
            id: record.id,
            title: record.title,
            members: record.members,
            thumbnail: record.thumbnail,
            duration,
            url: record.file.url,
        })
    }
}
