//! Grid and column configuration

use std::sync::Arc;

use panelkit_data::error::ConfigError;
use panelkit_data::model::Record;
use panelkit_data::model::Value;
use serde::Deserialize;
use serde::Serialize;

use crate::widgets::selection::SelectionConfig;

/// Horizontal alignment of a column's cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Whether and by which field a column sorts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sortable {
    /// `true` sorts by the column's `dataIndex`.
    Flag(bool),
    /// Sorts by an alternate field.
    Field(String),
}

impl Default for Sortable {
    fn default() -> Self {
        Sortable::Flag(false)
    }
}

/// Input of a cell renderer.
#[derive(Debug)]
pub struct Cell<'a> {
    /// The cell's value.
    pub value: &'a Value,
    /// The row's record.
    pub record: &'a Record,
    /// Row index in the store's records.
    pub row: usize,
    /// Leaf column index.
    pub column: usize,
    /// The column's `dataIndex`.
    pub data_index: &'a str,
}

/// Produces the markup of a cell.
#[derive(Clone)]
pub struct CellRenderer(Arc<dyn Fn(&Cell<'_>) -> String + Send + Sync>);

impl CellRenderer {
    /// Wraps a render function.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Cell<'_>) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    /// Renders a cell.
    pub fn render(&self, cell: &Cell<'_>) -> String {
        (self.0)(cell)
    }
}

impl std::fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CellRenderer")
    }
}

/// Declaration of a column or column group.
///
/// A declaration with `columns` is a group; its width, flex and hidden
/// state derive from its children.
///
/// # Example
///
/// ```
/// use panelkit::widgets::grid::ColumnConfig;
///
/// let name = ColumnConfig::new("Name", "name").with_min_width(120).sortable();
/// let group = ColumnConfig::group("Contact", vec![
///     ColumnConfig::new("Email", "email").with_width(200),
///     ColumnConfig::new("Phone", "phone").with_width(120),
/// ]);
/// assert!(group.is_group());
/// assert_eq!(name.width, None);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnConfig {
    /// Header text.
    pub text: String,
    /// Record field shown by a leaf column.
    pub data_index: Option<String>,
    /// Fixed width.
    pub width: Option<u32>,
    /// Flex basis.
    pub min_width: Option<u32>,
    /// Sorting.
    pub sortable: Sortable,
    /// Whether the user may resize the column.
    #[serde(default = "default_true")]
    pub resizable: bool,
    /// Cell alignment.
    pub align: Align,
    /// Hidden columns take no space and are skipped by focus.
    pub hidden: bool,
    /// Child columns of a group.
    pub columns: Vec<ColumnConfig>,
    /// Custom cell renderer.
    #[serde(skip)]
    pub renderer: Option<CellRenderer>,
}

fn default_true() -> bool {
    true
}

impl ColumnConfig {
    /// Creates a leaf column.
    pub fn new(text: impl Into<String>, data_index: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data_index: Some(data_index.into()),
            resizable: true,
            ..Self::default()
        }
    }

    /// Creates a group column.
    pub fn group(text: impl Into<String>, columns: Vec<ColumnConfig>) -> Self {
        Self {
            text: text.into(),
            resizable: true,
            columns,
            ..Self::default()
        }
    }

    /// Sets a fixed width; clears the flex basis.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self.min_width = None;
        self
    }

    /// Sets a flex basis; clears the fixed width.
    pub fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = Some(min_width);
        self.width = None;
        self
    }

    /// Sorts by the column's `dataIndex`.
    pub fn sortable(mut self) -> Self {
        self.sortable = Sortable::Flag(true);
        self
    }

    /// Sorts by another field.
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sortable = Sortable::Field(field.into());
        self
    }

    /// Sets resizability.
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Sets the alignment.
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Hides the column.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Sets a cell renderer.
    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(&Cell<'_>) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(CellRenderer::new(render));
        self
    }

    /// Whether this declares a group.
    pub fn is_group(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// Configuration of a [`Grid`](super::Grid).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Number of leading top-level headers pinned to the left.
    pub freeze: usize,
    /// Row height in pixels.
    ///
    /// Default: 32
    pub row_height: u32,
    /// Header height in pixels.
    ///
    /// Default: 32
    pub header_height: u32,
    /// Width of the checkbox column.
    ///
    /// Default: 40
    pub check_column_width: u32,
    /// Selection behavior.
    pub selection: SelectionConfig,
    /// Column declarations.
    pub columns: Vec<ColumnConfig>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            freeze: 0,
            row_height: 32,
            header_height: 32,
            check_column_width: 40,
            selection: SelectionConfig::default(),
            columns: Vec::new(),
        }
    }
}

impl GridConfig {
    /// Creates a grid config with columns and default values.
    pub fn new(columns: Vec<ColumnConfig>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the freeze count.
    pub fn with_freeze(mut self, freeze: usize) -> Self {
        self.freeze = freeze;
        self
    }

    /// Sets the row height.
    pub fn with_row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    /// Sets the header height.
    pub fn with_header_height(mut self, height: u32) -> Self {
        self.header_height = height;
        self
    }

    /// Sets the selection behavior.
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection.normalized();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::selection::SelectionDisplay;

    #[test]
    fn test_parses_nested_columns() {
        let config = GridConfig::from_json(
            r#"{
                "freeze": 1,
                "selection": {"display": "check", "keepable": true},
                "columns": [
                    {"text": "Id", "dataIndex": "id", "width": 60},
                    {"text": "Name", "columns": [
                        {"text": "First", "dataIndex": "first", "minWidth": 80, "sortable": true},
                        {"text": "Last", "dataIndex": "last", "sortable": "last_sort"}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.freeze, 1);
        assert_eq!(config.row_height, 32);
        assert_eq!(config.selection.display, SelectionDisplay::Check);
        assert!(config.columns[0].resizable);
        assert!(config.columns[1].is_group());
        assert_eq!(config.columns[1].columns[0].sortable, Sortable::Flag(true));
        assert_eq!(
            config.columns[1].columns[1].sortable,
            Sortable::Field("last_sort".to_string())
        );
    }

    #[test]
    fn test_width_and_min_width_are_exclusive() {
        let column = ColumnConfig::new("A", "a").with_width(100).with_min_width(40);
        assert_eq!((column.width, column.min_width), (None, Some(40)));
    }
}
