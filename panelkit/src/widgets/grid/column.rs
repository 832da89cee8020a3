//! Column tree.
//!
//! Columns live in an arena addressed by [`ColumnKey`]. Leaves carry the
//! sizing model; a group's basis, flex and hidden state are always derived
//! from its children.

use super::config::Align;
use super::config::CellRenderer;
use super::config::ColumnConfig;
use super::config::Sortable;

/// Flex basis of a leaf declaring neither `width` nor `minWidth`.
pub const DEFAULT_MIN_WIDTH: u32 = 100;

/// Handle of a column in a [`ColumnTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey(usize);

/// Width and visibility last applied to the rendered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rendered {
    pub width: u32,
    pub hidden: bool,
}

/// One column or group.
#[derive(Debug, Clone)]
pub struct Column {
    pub(crate) text: String,
    pub(crate) data_index: Option<String>,
    pub(crate) width: Option<u32>,
    pub(crate) min_width: Option<u32>,
    pub(crate) sortable: Sortable,
    pub(crate) resizable: bool,
    pub(crate) align: Align,
    pub(crate) hidden: bool,
    pub(crate) renderer: Option<CellRenderer>,
    pub(crate) check: bool,
    pub(crate) parent: Option<ColumnKey>,
    pub(crate) children: Vec<ColumnKey>,
    pub(crate) rendered: Option<Rendered>,
}

impl Column {
    fn from_config(config: &ColumnConfig, parent: Option<ColumnKey>) -> Self {
        // width wins when both are declared
        let min_width = if config.width.is_some() { None } else { config.min_width };
        Self {
            text: config.text.clone(),
            data_index: config.data_index.clone(),
            width: config.width,
            min_width,
            sortable: config.sortable.clone(),
            resizable: config.resizable,
            align: config.align,
            hidden: config.hidden,
            renderer: config.renderer.clone(),
            check: false,
            parent,
            children: Vec::new(),
            rendered: None,
        }
    }

    fn check_column(width: u32) -> Self {
        Self {
            text: String::new(),
            data_index: None,
            width: Some(width),
            min_width: None,
            sortable: Sortable::Flag(false),
            resizable: false,
            align: Align::Center,
            hidden: false,
            renderer: None,
            check: true,
            parent: None,
            children: Vec::new(),
            rendered: None,
        }
    }

    /// Header text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Record field shown by the column.
    pub fn data_index(&self) -> Option<&str> {
        self.data_index.as_deref()
    }

    /// Fixed width, if set.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Flex basis, if set.
    pub fn min_width(&self) -> Option<u32> {
        self.min_width
    }

    /// Cell alignment.
    pub fn align(&self) -> Align {
        self.align
    }

    /// Whether this is the synthetic checkbox column.
    pub fn is_check(&self) -> bool {
        self.check
    }

    /// Whether this is a group.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Field sorted on when the header is activated.
    pub fn sort_field(&self) -> Option<&str> {
        match &self.sortable {
            Sortable::Flag(true) => self.data_index.as_deref(),
            Sortable::Field(field) => Some(field),
            Sortable::Flag(false) => None,
        }
    }
}

/// Arena of columns with the flattened leaf order.
#[derive(Debug, Clone, Default)]
pub struct ColumnTree {
    nodes: Vec<Column>,
    roots: Vec<ColumnKey>,
    leaves: Vec<ColumnKey>,
    check: Option<ColumnKey>,
}

impl ColumnTree {
    /// Builds the tree, optionally prepending a checkbox column.
    pub fn new(configs: &[ColumnConfig], check_width: Option<u32>) -> Self {
        let mut tree = Self::default();
        if let Some(width) = check_width {
            let key = tree.push(Column::check_column(width));
            tree.roots.push(key);
            tree.check = Some(key);
        }
        for config in configs {
            let key = tree.insert(config, None);
            tree.roots.push(key);
        }
        tree.leaves = tree.collect_leaves();
        tree
    }

    fn push(&mut self, column: Column) -> ColumnKey {
        let key = ColumnKey(self.nodes.len());
        self.nodes.push(column);
        key
    }

    fn insert(&mut self, config: &ColumnConfig, parent: Option<ColumnKey>) -> ColumnKey {
        let key = self.push(Column::from_config(config, parent));
        let children: Vec<ColumnKey> = config
            .columns
            .iter()
            .map(|child| self.insert(child, Some(key)))
            .collect();
        self.nodes[key.0].children = children;
        key
    }

    fn collect_leaves(&self) -> Vec<ColumnKey> {
        let mut leaves = Vec::new();
        let mut stack: Vec<ColumnKey> = self.roots.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            let node = &self.nodes[key.0];
            if node.children.is_empty() {
                leaves.push(key);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// A column by key.
    pub fn get(&self, key: ColumnKey) -> Option<&Column> {
        self.nodes.get(key.0)
    }

    pub(crate) fn get_mut(&mut self, key: ColumnKey) -> Option<&mut Column> {
        self.nodes.get_mut(key.0)
    }

    /// Every key, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = ColumnKey> + '_ {
        (0..self.nodes.len()).map(ColumnKey)
    }

    /// Top-level headers, the checkbox column first when present.
    pub fn roots(&self) -> &[ColumnKey] {
        &self.roots
    }

    /// Leaf columns left to right; the position is the column index.
    pub fn leaves(&self) -> &[ColumnKey] {
        &self.leaves
    }

    /// Key of the leaf at a column index.
    pub fn leaf(&self, index: usize) -> Option<ColumnKey> {
        self.leaves.get(index).copied()
    }

    /// Column index of a leaf.
    pub fn leaf_index(&self, key: ColumnKey) -> Option<usize> {
        self.leaves.iter().position(|k| *k == key)
    }

    /// The checkbox column.
    pub fn check_column(&self) -> Option<ColumnKey> {
        self.check
    }

    /// Number of user-declared top-level headers.
    pub fn header_count(&self) -> usize {
        self.roots.len() - usize::from(self.check.is_some())
    }

    /// Parent chain of a column, nearest first.
    pub fn ancestors(&self, key: ColumnKey) -> Vec<ColumnKey> {
        let mut out = Vec::new();
        let mut current = self.get(key).and_then(|c| c.parent);
        while let Some(parent) = current {
            out.push(parent);
            current = self.get(parent).and_then(|c| c.parent);
        }
        out
    }

    /// Top-level header containing a column.
    pub fn root_of(&self, key: ColumnKey) -> ColumnKey {
        self.ancestors(key).last().copied().unwrap_or(key)
    }

    /// Leaf descendants of a column, left to right.
    pub fn leaves_of(&self, key: ColumnKey) -> Vec<ColumnKey> {
        self.leaves
            .iter()
            .copied()
            .filter(|leaf| *leaf == key || self.ancestors(*leaf).contains(&key))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Derived sizing
    // -------------------------------------------------------------------------

    /// A leaf is hidden by its flag; a group iff all its children are.
    pub fn is_hidden(&self, key: ColumnKey) -> bool {
        let Some(node) = self.get(key) else {
            return true;
        };
        if node.children.is_empty() {
            node.hidden
        } else {
            node.children.iter().all(|child| self.is_hidden(*child))
        }
    }

    /// Flex grow: 0 for fixed leaves, 1 for flex leaves, the sum of the
    /// visible children for groups.
    pub fn flex(&self, key: ColumnKey) -> u32 {
        let Some(node) = self.get(key) else {
            return 0;
        };
        if node.children.is_empty() {
            u32::from(node.width.is_none() && !node.hidden)
        } else {
            node.children
                .iter()
                .filter(|child| !self.is_hidden(**child))
                .map(|child| self.flex(*child))
                .sum()
        }
    }

    /// Basis width: `width` or `minWidth` for leaves; for groups the sum
    /// of the visible children plus one pixel between each.
    pub fn basis(&self, key: ColumnKey) -> u32 {
        let Some(node) = self.get(key) else {
            return 0;
        };
        if node.children.is_empty() {
            return node.width.or(node.min_width).unwrap_or(DEFAULT_MIN_WIDTH);
        }
        let visible: Vec<u32> = node
            .children
            .iter()
            .filter(|child| !self.is_hidden(**child))
            .map(|child| self.basis(*child))
            .collect();
        visible.iter().sum::<u32>() + (visible.len() as u32).saturating_sub(1)
    }

    /// Only leaf columns that allow it can be resized.
    pub fn is_resizable(&self, key: ColumnKey) -> bool {
        self.get(key)
            .is_some_and(|node| node.children.is_empty() && node.resizable && !node.check)
    }

    /// Sets a fixed width and clears the flex basis. Leaves only.
    pub(crate) fn set_width(&mut self, key: ColumnKey, width: u32) -> bool {
        match self.get_mut(key) {
            Some(node) if node.children.is_empty() => {
                node.width = Some(width);
                node.min_width = None;
                true
            }
            _ => false,
        }
    }

    /// Hides or shows a column; for groups, every leaf below it.
    pub(crate) fn set_hidden(&mut self, key: ColumnKey, hidden: bool) -> bool {
        let leaves = self.leaves_of(key);
        let mut changed = false;
        for leaf in leaves {
            if let Some(node) = self.get_mut(leaf)
                && !node.check
                && node.hidden != hidden
            {
                node.hidden = hidden;
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ColumnTree {
        ColumnTree::new(
            &[
                ColumnConfig::new("Id", "id").with_width(60),
                ColumnConfig::group(
                    "Name",
                    vec![
                        ColumnConfig::new("First", "first").with_min_width(80),
                        ColumnConfig::new("Last", "last").with_min_width(90),
                        ColumnConfig::new("Middle", "middle").hidden(),
                    ],
                ),
            ],
            None,
        )
    }

    #[test]
    fn test_leaves_flatten_left_to_right() {
        let tree = tree();
        let names: Vec<&str> = tree
            .leaves()
            .iter()
            .map(|k| tree.get(*k).unwrap().text())
            .collect();
        assert_eq!(names, ["Id", "First", "Last", "Middle"]);
        assert_eq!(tree.header_count(), 2);
    }

    #[test]
    fn test_group_sizing_derives_from_visible_children() {
        let tree = tree();
        let group = tree.roots()[1];
        assert_eq!(tree.basis(group), 80 + 90 + 1);
        assert_eq!(tree.flex(group), 2);
        assert!(!tree.is_hidden(group));
        assert!(!tree.is_resizable(group));
    }

    #[test]
    fn test_group_hidden_iff_all_children_hidden() {
        let mut tree = tree();
        let group = tree.roots()[1];
        tree.set_hidden(group, true);
        assert!(tree.is_hidden(group));
        assert_eq!(tree.flex(group), 0);
    }

    #[test]
    fn test_check_column_is_pinned_first_and_fixed() {
        let tree = ColumnTree::new(&[ColumnConfig::new("A", "a")], Some(40));
        let check = tree.leaves()[0];
        assert!(tree.get(check).unwrap().is_check());
        assert_eq!(tree.basis(check), 40);
        assert!(!tree.is_resizable(check));
        assert_eq!(tree.header_count(), 1);
    }
}
