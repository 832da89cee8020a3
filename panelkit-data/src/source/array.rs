//! In-memory data source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::DataSource;
use super::LoadParams;
use super::LoadResult;
use super::Row;
use crate::error::LoadError;
use crate::model::Record;

type Transform = Arc<dyn Fn(Vec<Row>) -> Vec<Row> + Send + Sync>;

/// A source backed by a fixed array of rows.
///
/// Remote sorters and filters in the load parameters are applied to the
/// rows before paging, so a store in remote mode behaves as it would
/// against a server.
///
/// # Example
///
/// ```
/// use panelkit_data::source::ArraySource;
/// use serde_json::json;
///
/// let source = ArraySource::from_json(json!([{"id": 1}, {"id": 2}]));
/// assert_eq!(source.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ArraySource {
    rows: Vec<Row>,
    transform: Option<Transform>,
    latency: Option<Duration>,
}

impl ArraySource {
    /// Creates a source from rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            transform: None,
            latency: None,
        }
    }

    /// Creates a source from a JSON array; non-object items are skipped.
    pub fn from_json(value: serde_json::Value) -> Self {
        let rows = match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::Object(row) => Some(row),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        Self::new(rows)
    }

    /// Sets a transform applied to the rows on every fetch.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<Row>) -> Vec<Row> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Delays every fetch, simulating a slow source.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of rows before transform.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the source has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl DataSource for ArraySource {
    async fn fetch(&self, params: &LoadParams) -> Result<LoadResult, LoadError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let rows = match &self.transform {
            Some(transform) => transform(self.rows.clone()),
            None => self.rows.clone(),
        };

        let mut rows: Vec<(Record, Row)> = rows
            .into_iter()
            .map(|row| (Record::from_row(row.clone(), &[], Arc::from([])), row))
            .collect();

        if let Some(filters) = params.filters.as_ref().filter(|f| !f.is_empty()) {
            let mut set = filters.compile();
            rows.retain(|(record, _)| set.matches(record));
        }
        if let Some(sorters) = params.sorters.as_ref().filter(|s| !s.is_empty()) {
            rows.sort_by(|(a, _), (b, _)| sorters.compare(a, b));
        }

        let total = rows.len();
        let page = rows
            .into_iter()
            .skip(params.start)
            .take(if params.limit == 0 { usize::MAX } else { params.limit })
            .map(|(_, row)| row)
            .collect();

        Ok(LoadResult::new(page).with_total(total))
    }
}

impl std::fmt::Debug for ArraySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArraySource")
            .field("rows", &self.rows.len())
            .field("transform", &self.transform.is_some())
            .field("latency", &self.latency)
            .finish()
    }
}
