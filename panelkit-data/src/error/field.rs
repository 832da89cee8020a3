//! Typed getter failures

use crate::model::FieldType;
use crate::model::Record;
use crate::model::Value;

/// A typed getter on a [`Record`] could not produce a value.
///
/// `record` is the identity hash of the record the getter ran on, so a
/// failure can be traced back to its row after the store re-sorts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// The record carries no such field. Distinct from a null value.
    #[error("record {record} has no field '{field}'")]
    Absent { record: String, field: String },

    /// The field holds a value the getter does not convert.
    #[error("field '{field}' of record {record} holds {found}, wanted {wanted:?}")]
    Unconvertible {
        record: String,
        field: String,
        wanted: FieldType,
        found: &'static str,
    },
}

impl FieldError {
    pub(crate) fn absent(record: &Record, field: &str) -> Self {
        Self::Absent {
            record: record.hash().to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn unconvertible(record: &Record, field: &str, wanted: FieldType, found: &Value) -> Self {
        Self::Unconvertible {
            record: record.hash().to_string(),
            field: field.to_string(),
            wanted,
            found: found.type_name(),
        }
    }

    /// Name of the field the getter asked for.
    pub fn field(&self) -> &str {
        match self {
            Self::Absent { field, .. } | Self::Unconvertible { field, .. } => field,
        }
    }
}
