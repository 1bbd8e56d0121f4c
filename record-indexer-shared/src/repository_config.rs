//! Upstream repository descriptions.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fields every repository variant carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryCommon {
    /// Unique key used to select this repository.
    pub code: String,
    pub name: String,
    pub base_url: String,
    /// Target index for every record of this repository.
    pub index_name: String,
    /// Page size for upstream fetches. `None` fetches everything in one call.
    pub pagination_size: Option<u32>,
    /// Event topic carrying record batches for this repository.
    pub kafka_topic: Option<String>,
}

/// A repository that exposes studies and their analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRepositoryConfig {
    #[serde(flatten)]
    pub common: RepositoryCommon,
    /// Analysis states requested upstream. Empty means no filter.
    pub indexable_study_states: BTreeSet<String>,
    pub analysis_centric_enabled: bool,
    pub organization: Option<String>,
    pub country: Option<String>,
}

/// A repository that exposes records grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricRepositoryConfig {
    #[serde(flatten)]
    pub common: RepositoryCommon,
    pub category_id: u32,
    pub valid_data_only: bool,
}

/// Closed set of repository variants, chosen once at configuration load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum RepositoryConfig {
    Song(SongRepositoryConfig),
    Lyric(LyricRepositoryConfig),
}

impl RepositoryConfig {
    pub fn common(&self) -> &RepositoryCommon {
        match self {
            RepositoryConfig::Song(song) => &song.common,
            RepositoryConfig::Lyric(lyric) => &lyric.common,
        }
    }

    pub fn code(&self) -> &str {
        &self.common().code
    }

    pub fn index_name(&self) -> &str {
        &self.common().index_name
    }

    pub fn kafka_topic(&self) -> Option<&str> {
        self.common().kafka_topic.as_deref()
    }

    pub fn kind(&self) -> RepositoryKind {
        match self {
            RepositoryConfig::Song(_) => RepositoryKind::Song,
            RepositoryConfig::Lyric(_) => RepositoryKind::Lyric,
        }
    }
}

/// Discriminant of [`RepositoryConfig`], as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryKind {
    Song,
    Lyric,
}

impl FromStr for RepositoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SONG" => Ok(RepositoryKind::Song),
            "LYRIC" => Ok(RepositoryKind::Lyric),
            other => Err(format!("unknown repository type '{other}'")),
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryKind::Song => write!(f, "SONG"),
            RepositoryKind::Lyric => write!(f, "LYRIC"),
        }
    }
}

/// Find the repository with the given code.
pub fn find_repository<'a>(
    repositories: &'a [RepositoryConfig],
    code: &str,
) -> Option<&'a RepositoryConfig> {
    repositories.iter().find(|repo| repo.code() == code)
}
