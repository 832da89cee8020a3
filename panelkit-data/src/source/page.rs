//! Load result type.

use serde::Deserialize;
use serde::Serialize;

use crate::error::LoadError;

/// Raw JSON row as delivered by a source.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Names of the response fields carrying rows and the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseFields {
    /// Field holding the row array. Default: `records`.
    pub records: String,
    /// Field holding the total count. Default: `total`.
    pub total: String,
}

impl Default for ResponseFields {
    fn default() -> Self {
        Self {
            records: "records".to_string(),
            total: "total".to_string(),
        }
    }
}

/// One batch of rows returned by a [`DataSource`](super::DataSource).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadResult {
    rows: Vec<Row>,
    /// Total row count on the source, when it reports one.
    total: Option<usize>,
}

impl LoadResult {
    /// Creates a result from rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, total: None }
    }

    /// Sets the total row count.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Parses a `{ success, <records>, <total> }` response body.
    pub fn from_response(body: serde_json::Value, fields: &ResponseFields) -> Result<Self, LoadError> {
        let serde_json::Value::Object(mut body) = body else {
            return Err(LoadError::parse("response is not an object"));
        };

        if body.get("success").and_then(serde_json::Value::as_bool) != Some(true) {
            let message = body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            return Err(LoadError::Rejected { message });
        }

        let rows = match body.remove(&fields.records) {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::Object(row) => Ok(row),
                    other => Err(LoadError::parse(format!("row is not an object: {other}"))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(LoadError::parse(format!("'{}' is not an array", fields.records)));
            }
            None => return Err(LoadError::parse(format!("missing '{}'", fields.records))),
        };

        let total = body
            .get(&fields.total)
            .and_then(serde_json::Value::as_u64)
            .map(|n| n as usize);

        Ok(Self { rows, total })
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes the result and returns the rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Total reported by the source, if any.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Number of rows in this batch.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
