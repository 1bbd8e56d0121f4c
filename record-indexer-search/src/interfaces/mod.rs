//! Interface definitions for the search engine.
//!
//! This module defines the abstract `SearchIndexProvider` trait that allows
//! for dependency injection and swappable engine protocol versions.

mod search_index_provider;

pub use search_index_provider::SearchIndexProvider;
