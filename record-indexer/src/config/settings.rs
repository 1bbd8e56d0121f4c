//! Environment-driven settings.

use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use record_indexer_repository::http::DEFAULT_TIMEOUT;
use record_indexer_search::{BasicAuth, EngineVersion, SearchEngineConfig};
use record_indexer_shared::{
    LyricRepositoryConfig, RepositoryCommon, RepositoryConfig, RepositoryKind, SongRepositoryConfig,
};

use crate::IndexingError;

/// Default search engine node.
const DEFAULT_NODE: &str = "http://localhost:9200";

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "record-indexer";

/// Study states indexed when none are configured.
const DEFAULT_STUDY_STATES: &str = "PUBLISHED";

/// Kafka connection settings. Present only when a broker is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    pub broker: String,
    pub group_id: String,
    pub request_topic: Option<String>,
}

/// Everything the indexer reads from its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub search: SearchEngineConfig,
    pub repositories: Vec<RepositoryConfig>,
    pub kafka: Option<KafkaSettings>,
    pub http_timeout: Duration,
}

impl Settings {
    /// Load settings from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self, IndexingError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through a variable lookup.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value of a variable, if set
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Parsed settings
    /// * `Err(IndexingError)` - If a value is malformed, a required key is
    ///   missing, or two repositories share a code
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        Ok(Self {
            search: search_settings(&vars)?,
            repositories: repository_settings(&vars)?,
            kafka: kafka_settings(&vars),
            http_timeout: vars
                .parse::<u64>("REPOSITORY_HTTP_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

/// Typed access to the variable lookup. Blank values count as unset.
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, IndexingError> {
        self.get(key)
            .ok_or_else(|| IndexingError::config(format!("{} is required", key)))
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, IndexingError> {
        self.get(key)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|_| IndexingError::config(format!("{} has invalid value '{}'", key, value)))
            })
            .transpose()
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, IndexingError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(IndexingError::config(format!(
                    "{} has invalid value '{}'",
                    key, value
                ))),
            },
        }
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|value| {
            value
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
    }
}

fn search_settings<F>(vars: &Vars<F>) -> Result<SearchEngineConfig, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = SearchEngineConfig::default();

    let nodes = vars
        .list("ELASTICSEARCH_NODES")
        .filter(|nodes| !nodes.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_NODE.to_string()]);

    let version = match vars.parse::<u32>("ELASTICSEARCH_VERSION")? {
        Some(major) => EngineVersion::from_major(major)?,
        None => defaults.version,
    };

    let basic_auth = if vars.flag("ELASTICSEARCH_BASIC_AUTH_ENABLED", false)? {
        Some(BasicAuth {
            user: vars.required("ELASTICSEARCH_USER")?,
            password: vars.required("ELASTICSEARCH_PASSWORD")?,
        })
    } else {
        None
    };

    let docs_per_bulk_request = match vars.parse::<usize>("ELASTICSEARCH_DOCS_PER_BULK_REQUEST")? {
        Some(0) => None,
        Some(size) => Some(size),
        None => defaults.docs_per_bulk_request,
    };

    Ok(SearchEngineConfig {
        nodes,
        version,
        basic_auth,
        connection_timeout: vars
            .parse::<u64>("ELASTICSEARCH_CONNECTION_TIMEOUT_MS")?
            .map(Duration::from_millis),
        max_retries: vars
            .parse::<u32>("ELASTICSEARCH_RETRY_MAX_ATTEMPTS")?
            .unwrap_or(defaults.max_retries),
        retry_wait: vars
            .parse::<u64>("ELASTICSEARCH_RETRY_WAIT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_wait),
        docs_per_bulk_request,
    })
}

/// Scan `REPOSITORIES_{i}_*` groups from zero until a group has no base URL.
fn repository_settings<F>(vars: &Vars<F>) -> Result<Vec<RepositoryConfig>, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut repositories = Vec::new();
    let mut codes = HashSet::new();

    for i in 0.. {
        let key = |name: &str| format!("REPOSITORIES_{}_{}", i, name);

        let Some(base_url) = vars.get(&key("BASE_URL")) else {
            break;
        };

        let common = RepositoryCommon {
            code: vars.required(&key("CODE"))?,
            name: vars.get(&key("NAME")).unwrap_or_default(),
            base_url,
            index_name: vars.required(&key("INDEX_NAME"))?,
            pagination_size: vars.parse::<u32>(&key("PAGINATION_SIZE"))?.filter(|size| *size > 0),
            kafka_topic: vars.get(&key("KAFKA_TOPIC")),
        };

        if !codes.insert(common.code.clone()) {
            return Err(IndexingError::config(format!(
                "{} duplicates repository code '{}'",
                key("CODE"),
                common.code
            )));
        }

        let type_key = key("TYPE");
        let kind = RepositoryKind::from_str(&vars.required(&type_key)?)
            .map_err(|e| IndexingError::config(format!("{}: {}", type_key, e)))?;

        let config = match kind {
            RepositoryKind::Song => RepositoryConfig::Song(SongRepositoryConfig {
                common,
                indexable_study_states: vars
                    .list(&key("SONG_INDEXABLE_STUDY_STATES"))
                    .unwrap_or_else(|| vec![DEFAULT_STUDY_STATES.to_string()])
                    .into_iter()
                    .collect(),
                analysis_centric_enabled: vars.flag(&key("SONG_ANALYSIS_CENTRIC_ENABLED"), true)?,
                organization: vars.get(&key("SONG_ORGANIZATION")),
                country: vars.get(&key("SONG_COUNTRY")),
            }),
            RepositoryKind::Lyric => RepositoryConfig::Lyric(LyricRepositoryConfig {
                common,
                category_id: vars
                    .parse::<u32>(&key("LYRIC_CATEGORY_ID"))?
                    .ok_or_else(|| IndexingError::config(format!("{} is required", key("LYRIC_CATEGORY_ID"))))?,
                valid_data_only: vars.flag(&key("LYRIC_VALID_DATA_ONLY"), true)?,
            }),
        };

        repositories.push(config);
    }

    Ok(repositories)
}

fn kafka_settings<F>(vars: &Vars<F>) -> Option<KafkaSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let broker = vars.get("KAFKA_BROKER")?;

    Some(KafkaSettings {
        broker,
        group_id: vars
            .get("KAFKA_GROUP_ID")
            .unwrap_or_else(|| DEFAULT_KAFKA_GROUP_ID.to_string()),
        request_topic: vars.get("KAFKA_REQUEST_TOPIC"),
    })
}
