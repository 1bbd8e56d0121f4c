//! Outcome types reported by search index providers.

/// Engine verdicts that count as a successful single-document write.
const APPLIED_RESULTS: [&str; 2] = ["created", "updated"];

/// Engine verdict for a successful delete.
const DELETED_RESULT: &str = "deleted";

/// Verdict for a single-document write.
///
/// `result` holds the engine's `result` field (`created`, `updated`,
/// `deleted`, `not_found`, `noop`) or, when the engine rejected the request,
/// the reason it gave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub result: String,
}

impl WriteOutcome {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }

    /// Whether an index or update call stored the document.
    pub fn is_applied(&self) -> bool {
        APPLIED_RESULTS.contains(&self.result.as_str())
    }

    /// Whether a delete call removed the document.
    pub fn is_deleted(&self) -> bool {
        self.result == DELETED_RESULT
    }
}

/// Outcome of one item of a bulk request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkItemOutcome {
    /// Failure reason reported by the engine, if the item failed.
    pub error: Option<String>,
}

impl BulkItemOutcome {
    pub fn ok() -> Self {
        Self { error: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
        }
    }
}
