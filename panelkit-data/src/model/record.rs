//! Dynamic store record

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::Digest;
use sha2::Sha256;

use super::Field;
use super::FieldType;
use super::Value;
use crate::error::FieldError;

/// One row of typed key/value data plus an identity hash.
///
/// Identity is decided by the primary-key subset of the fields (or all
/// fields when no primary keys are declared). The hash over that subset is
/// computed lazily and cached; identity fields are never mutated after
/// construction, so the cache is never invalidated.
///
/// # Example
///
/// ```
/// use panelkit_data::model::Record;
///
/// let a = Record::new().set("id", 1).set("name", "a").with_primary_keys(["id"]);
/// let b = Record::new().set("id", 1).set("name", "b").with_primary_keys(["id"]);
/// assert_eq!(a, b);
/// assert_eq!(a.get_str("name").unwrap(), Some("a"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// The field values.
    pub(crate) data: HashMap<String, Value>,

    /// Field names used for identity. Empty means all fields.
    pub(crate) primary_keys: Arc<[String]>,

    hash: OnceLock<String>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a raw JSON row, coercing declared fields.
    ///
    /// Undeclared fields are kept untyped.
    pub fn from_row(
        row: serde_json::Map<String, serde_json::Value>,
        fields: &[Field],
        primary_keys: Arc<[String]>,
    ) -> Self {
        let mut data: HashMap<String, Value> = row
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect();

        for field in fields {
            if let Some(value) = data.remove(&field.name) {
                data.insert(field.name.clone(), field.kind.coerce(value));
            }
        }

        Self {
            data,
            primary_keys,
            hash: OnceLock::new(),
        }
    }

    /// Sets the primary keys (builder pattern).
    ///
    /// Only valid before the hash has been observed.
    pub fn with_primary_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = keys.into_iter().map(Into::into).collect();
        self.hash = OnceLock::new();
        self
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(field.into(), value.into());
        self.hash = OnceLock::new();
        self
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Returns the field value, or `Null` when the field is absent.
    pub fn value(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.data.get(field).unwrap_or(&NULL)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    /// Returns the declared primary keys.
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Stable digest of the identity fields.
    pub fn hash(&self) -> &str {
        self.hash.get_or_init(|| self.compute_hash())
    }

    fn compute_hash(&self) -> String {
        let keys: Vec<&str> = if self.primary_keys.is_empty() {
            let mut keys: Vec<&str> = self.data.keys().map(String::as_str).collect();
            keys.sort_unstable();
            keys
        } else {
            self.primary_keys.iter().map(String::as_str).collect()
        };

        let canonical = serde_json::Value::Array(
            keys.iter()
                .map(|key| serde_json::json!([key, self.value(key).to_json()]))
                .collect(),
        );

        let digest = Sha256::digest(canonical.to_string().as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    /// Converts the record back into a JSON object.
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.data
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect()
    }

    // =========================================================================
    // Typed getters
    //
    // Err when the field is absent or holds another type; Ok(None) for null.
    // =========================================================================

    fn typed<'a, T>(
        &'a self,
        field: &str,
        wanted: FieldType,
        convert: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, FieldError> {
        match self.data.get(field) {
            None => Err(FieldError::absent(self, field)),
            Some(Value::Null) => Ok(None),
            Some(value) => convert(value)
                .map(Some)
                .ok_or_else(|| FieldError::unconvertible(self, field, wanted, value)),
        }
    }

    /// Gets a string field value.
    pub fn get_str(&self, field: &str) -> Result<Option<&str>, FieldError> {
        self.typed(field, FieldType::String, Value::as_str)
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        self.typed(field, FieldType::Boolean, |value| match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        })
    }

    /// Gets an integer field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        self.typed(field, FieldType::Int, |value| match value {
            Value::Int(n) => Some(*n),
            _ => None,
        })
    }

    /// Gets a float field value. Integers widen.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        self.typed(field, FieldType::Float, |value| match value {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for Record {}
