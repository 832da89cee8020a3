//! Store configuration

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::model::Field;
use crate::query::Filters;
use crate::query::Sorters;
use crate::source::ResponseFields;

/// Configuration of a [`Store`](super::Store).
///
/// # Example
///
/// ```
/// use panelkit_data::model::{Field, FieldType};
/// use panelkit_data::query::Sorters;
/// use panelkit_data::store::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_fields([Field::typed("id", FieldType::Int), Field::new("name")])
///     .with_primary_keys(["id"])
///     .with_sorters(Sorters::asc("name"))
///     .with_limit(50);
/// assert_eq!(config.limit, 50);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Declared fields; their types are applied on ingest.
    pub fields: Vec<Field>,

    /// Identity fields. Empty means all fields.
    pub primary_keys: Vec<String>,

    /// Delegate sorting to the source.
    pub remote_sort: bool,

    /// Delegate filtering to the source.
    pub remote_filter: bool,

    /// Page size.
    ///
    /// Default: 0 (no paging)
    pub limit: usize,

    /// Response field names.
    #[serde(flatten)]
    pub response: ResponseFields,

    /// Field holding child rows (tree stores only).
    ///
    /// Default: `children`
    pub children_field: String,

    /// Extra parameters sent with every load.
    pub params: BTreeMap<String, String>,

    /// Initial sorters.
    pub sorters: Sorters,

    /// Initial filters.
    pub filters: Filters,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            primary_keys: Vec::new(),
            remote_sort: false,
            remote_filter: false,
            limit: 0,
            response: ResponseFields::default(),
            children_field: "children".to_string(),
            params: BTreeMap::new(),
            sorters: Sorters::new(),
            filters: Filters::new(),
        }
    }
}

impl StoreConfig {
    /// Creates a store config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the declared fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    /// Sets the identity fields.
    pub fn with_primary_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables remote sorting.
    pub fn with_remote_sort(mut self, remote: bool) -> Self {
        self.remote_sort = remote;
        self
    }

    /// Enables or disables remote filtering.
    pub fn with_remote_filter(mut self, remote: bool) -> Self {
        self.remote_filter = remote;
        self
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the response field names.
    pub fn with_response_fields(mut self, response: ResponseFields) -> Self {
        self.response = response;
        self
    }

    /// Sets the children field.
    pub fn with_children_field(mut self, field: impl Into<String>) -> Self {
        self.children_field = field.into();
        self
    }

    /// Adds an extra load parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Sets the initial sorters.
    pub fn with_sorters(mut self, sorters: Sorters) -> Self {
        self.sorters = sorters;
        self
    }

    /// Sets the initial filters.
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub(crate) fn primary_keys_arc(&self) -> Arc<[String]> {
        self.primary_keys.iter().cloned().collect()
    }

    pub(crate) fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;

    #[test]
    fn test_from_json() {
        let config = StoreConfig::from_json(
            r#"{
                "fields": ["name", {"name": "age", "type": "int"}],
                "primaryKeys": ["id"],
                "remoteSort": true,
                "records": "rows",
                "sorters": {"name": "ASC"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.fields[1].kind, FieldType::Int);
        assert!(config.remote_sort);
        assert!(!config.remote_filter);
        assert_eq!(config.response.records, "rows");
        assert_eq!(config.response.total, "total");
        assert_eq!(config.children_field, "children");
        assert_eq!(config.sorters, Sorters::asc("name"));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(
            StoreConfig::from_json("{\"limit\": \"x\"}"),
            Err(ConfigError::Json(_))
        ));
    }
}
