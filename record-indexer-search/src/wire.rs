//! Wire helpers shared by the protocol providers.
//!
//! Both engine clients hand back a status code and a JSON body; everything
//! after that is protocol-independent and lives here.

use serde_json::{json, Value};

use crate::errors::SearchIndexError;
use crate::types::{BulkItemOutcome, WriteOutcome};
use record_indexer_shared::DataRecord;

const NOT_FOUND_RESULT: &str = "not_found";
const ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Parse a body that may be empty (HEAD requests) or not JSON.
pub(crate) fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}

/// Normalize an index-exists answer.
///
/// Accepts a bare boolean body, an object wrapping a boolean under `body`,
/// or falls back to the status code.
pub(crate) fn index_exists(status: u16, body: Option<&Value>) -> Result<bool, SearchIndexError> {
    match body {
        Some(Value::Bool(exists)) => return Ok(*exists),
        Some(Value::Object(map)) => {
            if let Some(Value::Bool(exists)) = map.get("body") {
                return Ok(*exists);
            }
        }
        _ => {}
    }

    match status {
        200..=299 => Ok(true),
        404 => Ok(false),
        other => Err(SearchIndexError::response(format!(
            "index exists check returned status {other}"
        ))),
    }
}

/// Interpret the answer to an index-create call.
pub(crate) fn index_created(status: u16, text: &str) -> Result<(), SearchIndexError> {
    if (200..300).contains(&status) || text.contains(ALREADY_EXISTS) {
        return Ok(());
    }
    Err(SearchIndexError::response(format!(
        "index create returned status {status}: {text}"
    )))
}

/// Interpret the answer to a single-document write.
pub(crate) fn write_outcome(
    status: u16,
    body: Option<&Value>,
) -> Result<WriteOutcome, SearchIndexError> {
    if let Some(result) = body.and_then(|b| b.get("result")).and_then(Value::as_str) {
        return Ok(WriteOutcome::new(result));
    }
    if let Some(reason) = body.and_then(error_reason) {
        return Ok(WriteOutcome::new(reason));
    }
    if status == 404 {
        return Ok(WriteOutcome::new(NOT_FOUND_RESULT));
    }
    Err(SearchIndexError::response(format!(
        "write returned status {status} without a result"
    )))
}

/// Split a bulk response into per-item outcomes, in request order.
pub(crate) fn bulk_items(
    status: u16,
    body: Option<&Value>,
) -> Result<Vec<BulkItemOutcome>, SearchIndexError> {
    let items = body
        .and_then(|b| b.get("items"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            let reason = body
                .and_then(error_reason)
                .unwrap_or_else(|| "missing items".to_string());
            SearchIndexError::response(format!("bulk returned status {status}: {reason}"))
        })?;

    Ok(items
        .iter()
        .map(|item| {
            // Each item is keyed by its action name.
            let operation = item.as_object().and_then(|ops| ops.values().next());
            match operation.and_then(|op| op.get("error")) {
                Some(error) => BulkItemOutcome::failed(reason_of(error)),
                None => BulkItemOutcome::ok(),
            }
        })
        .collect())
}

/// Build the newline-delimited body of a bulk index request.
pub(crate) fn bulk_lines(index: &str, documents: &[DataRecord]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(documents.len() * 2);
    for document in documents {
        let action = match document.id() {
            Some(id) => json!({"index": {"_index": index, "_id": id}}),
            None => json!({"index": {"_index": index}}),
        };
        lines.push(action);
        lines.push(document.clone().into_value());
    }
    lines
}

fn error_reason(body: &Value) -> Option<String> {
    body.get("error").map(reason_of)
}

fn reason_of(error: &Value) -> String {
    match error {
        Value::String(reason) => reason.clone(),
        Value::Object(fields) => fields
            .get("reason")
            .or_else(|| fields.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("error")
            .to_string(),
        _ => "error".to_string(),
    }
}
