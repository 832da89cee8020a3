//! Hierarchical record

use std::sync::Arc;

use super::Field;
use super::Record;

/// Child state of a [`TreeRecord`].
#[derive(Debug, Clone, Default)]
pub enum Children {
    /// Leaf node.
    #[default]
    None,
    /// Has children that are not loaded yet.
    Pending,
    /// Loaded child records.
    Loaded(Vec<TreeRecord>),
}

impl Children {
    /// Loaded children, empty for `None` and `Pending`.
    pub fn as_slice(&self) -> &[TreeRecord] {
        match self {
            Children::Loaded(children) => children,
            _ => &[],
        }
    }

    /// Whether the node has (or claims to have) children.
    pub fn has_children(&self) -> bool {
        match self {
            Children::None => false,
            Children::Pending => true,
            Children::Loaded(children) => !children.is_empty(),
        }
    }
}

/// A record that owns child records.
///
/// The children field is stripped from the record data at construction.
#[derive(Debug, Clone, Default)]
pub struct TreeRecord {
    record: Record,
    children: Children,
}

impl TreeRecord {
    /// Creates a tree record from a flat record and its children.
    pub fn new(record: Record, children: Children) -> Self {
        Self { record, children }
    }

    /// Builds a tree record from a raw JSON row.
    ///
    /// `children_field` holding an array becomes [`Children::Loaded`], the
    /// literal `true` becomes [`Children::Pending`].
    pub fn from_row(
        mut row: serde_json::Map<String, serde_json::Value>,
        fields: &[Field],
        primary_keys: Arc<[String]>,
        children_field: &str,
    ) -> Self {
        let children = match row.remove(children_field) {
            Some(serde_json::Value::Array(items)) => Children::Loaded(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::Object(child) => Some(TreeRecord::from_row(
                            child,
                            fields,
                            Arc::clone(&primary_keys),
                            children_field,
                        )),
                        other => {
                            log::warn!("skipping non-object child row: {other}");
                            None
                        }
                    })
                    .collect(),
            ),
            Some(serde_json::Value::Bool(true)) => Children::Pending,
            _ => Children::None,
        };

        Self {
            record: Record::from_row(row, fields, primary_keys),
            children,
        }
    }

    /// The node's own record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// The node's children.
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Replaces the node's children.
    pub fn set_children(&mut self, children: Children) {
        self.children = children;
    }

    /// Identity hash of the node's record.
    pub fn hash(&self) -> &str {
        self.record.hash()
    }
}

impl PartialEq for TreeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record
    }
}
