//! Outcome of an indexing operation.

use std::collections::BTreeMap;

use serde::Serialize;

/// Failure reasons keyed by record identity (or a synthetic key when the identity is unknown).
pub type FailureData = BTreeMap<String, Vec<String>>;

/// Result of one write, one batch, or one whole indexing operation.
///
/// `successful` always equals `failure_data.is_empty()`; the fields are private
/// so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResult {
    index_name: String,
    successful: bool,
    failure_data: FailureData,
}

impl IndexResult {
    /// A successful result with no failures.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            successful: true,
            failure_data: FailureData::new(),
        }
    }

    /// A failed result carrying a single failure entry.
    pub fn failure(
        index_name: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let mut result = Self::new(index_name);
        result.record_failure(key, reason);
        result
    }

    /// Append a failure reason under `key`.
    pub fn record_failure(&mut self, key: impl Into<String>, reason: impl Into<String>) {
        self.failure_data
            .entry(key.into())
            .or_default()
            .push(reason.into());
        self.successful = false;
    }

    /// Combine two results.
    ///
    /// Failure data is a right-biased union: for a key present in both, the
    /// entry from `other` replaces the one in `self`. The index name is taken
    /// from `other` and `successful` is recomputed from the union.
    pub fn merge(mut self, other: IndexResult) -> IndexResult {
        self.failure_data.extend(other.failure_data);
        self.index_name = other.index_name;
        self.successful = self.failure_data.is_empty();
        self
    }

    /// Left fold of [`IndexResult::merge`] over `results`, starting from a successful result for `index_name`.
    pub fn merge_all<I>(index_name: impl Into<String>, results: I) -> IndexResult
    where
        I: IntoIterator<Item = IndexResult>,
    {
        results
            .into_iter()
            .fold(IndexResult::new(index_name), IndexResult::merge)
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }

    pub fn failure_data(&self) -> &FailureData {
        &self.failure_data
    }
}
