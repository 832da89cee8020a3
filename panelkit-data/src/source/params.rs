//! Load request parameters.

use std::collections::BTreeMap;

use crate::query::Filters;
use crate::query::Sorters;

/// Parameters of one load request.
///
/// `sorters` and `filters` are only set when the store delegates sorting
/// or filtering to the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadParams {
    /// Requested field names.
    pub fields: Vec<String>,
    /// Offset of the first row.
    pub start: usize,
    /// Page size; `0` means unlimited.
    pub limit: usize,
    /// Remote sorters.
    pub sorters: Option<Sorters>,
    /// Remote filters.
    pub filters: Option<Filters>,
    /// Caller-supplied parameters.
    pub extra: BTreeMap<String, String>,
}

impl LoadParams {
    /// Flattens the parameters into query/form pairs.
    ///
    /// Sorters and filters are JSON-encoded.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.fields.is_empty() {
            pairs.push(("fields".to_string(), self.fields.join(",")));
        }
        pairs.push(("start".to_string(), self.start.to_string()));
        if self.limit > 0 {
            pairs.push(("limit".to_string(), self.limit.to_string()));
        }
        if let Some(sorters) = &self.sorters
            && let Ok(json) = serde_json::to_string(sorters)
        {
            pairs.push(("sorters".to_string(), json));
        }
        if let Some(filters) = &self.filters
            && let Ok(json) = serde_json::to_string(filters)
        {
            pairs.push(("filters".to_string(), json));
        }
        for (key, value) in &self.extra {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }
}
