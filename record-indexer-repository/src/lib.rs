//! # Record Indexer Repository
//!
//! Fetchers for the upstream systems records are indexed from. Each
//! repository variant exposes the same [`Repository`] interface: lazy,
//! page-by-page streams over a whole repository or one organization, and a
//! single-record lookup guarded by an ownership check.

pub mod errors;
pub mod http;
pub mod lyric;
pub mod repository;
pub mod song;

use std::sync::Arc;

pub use errors::RepositoryError;
pub use http::HttpClient;
pub use lyric::LyricRepository;
pub use repository::{RecordBatchStream, Repository};
pub use song::SongRepository;

use record_indexer_shared::RepositoryConfig;

/// Build the repository adapter matching a configuration variant.
pub fn repository_for(config: &RepositoryConfig, http: HttpClient) -> Arc<dyn Repository> {
    match config {
        RepositoryConfig::Song(song) => Arc::new(SongRepository::new(song.clone(), http)),
        RepositoryConfig::Lyric(lyric) => Arc::new(LyricRepository::new(lyric.clone(), http)),
    }
}
