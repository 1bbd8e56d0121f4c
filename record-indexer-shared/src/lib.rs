//! # Record Indexer Shared
//!
//! Value types shared by every crate of the record indexer: the nested
//! [`DataRecord`] fetched from upstream repositories, the [`IndexResult`]
//! returned by every write, and the [`RepositoryConfig`] describing where
//! records come from and which index they land in.

pub mod index_name;
pub mod record;
pub mod repository_config;
pub mod result;

pub use index_name::sanitize_index_name;
pub use record::{DataRecord, IDENTITY_FIELD};
pub use repository_config::{
    find_repository, LyricRepositoryConfig, RepositoryCommon, RepositoryConfig, RepositoryKind,
    SongRepositoryConfig,
};
pub use result::{FailureData, IndexResult};
