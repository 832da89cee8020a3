//! Shared selection state for grid, list and tree engines.
//!
//! Selections are keyed by record identity hash, so they survive
//! re-sorting and, with `keepable`, reloads.

use std::collections::HashMap;

use panelkit_data::model::Record;
use serde::Deserialize;
use serde::Serialize;

/// Visual affordance for selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionDisplay {
    /// Rows highlight when selected.
    #[default]
    Row,
    /// A leading checkbox column.
    Check,
}

/// Selection behavior.
///
/// `display: check` always implies `multiple` and `deselectable`; use
/// [`normalized`](Self::normalized) or build through the setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Master switch.
    pub selectable: bool,
    /// Visual affordance.
    pub display: SelectionDisplay,
    /// Allow more than one selected row.
    pub multiple: bool,
    /// Allow the user to deselect a selected row.
    pub deselectable: bool,
    /// Keep selections across reloads.
    pub keepable: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            selectable: true,
            display: SelectionDisplay::Row,
            multiple: false,
            deselectable: false,
            keepable: false,
        }
    }
}

impl SelectionConfig {
    /// Single row selection.
    pub fn single() -> Self {
        Self::default()
    }

    /// Multiple row selection.
    pub fn multiple() -> Self {
        Self {
            multiple: true,
            ..Self::default()
        }
    }

    /// Checkbox selection.
    pub fn check() -> Self {
        Self::default().with_display(SelectionDisplay::Check)
    }

    /// Selection disabled.
    pub fn none() -> Self {
        Self {
            selectable: false,
            ..Self::default()
        }
    }

    /// Sets the display, forcing `multiple` and `deselectable` for checks.
    pub fn with_display(mut self, display: SelectionDisplay) -> Self {
        self.display = display;
        self.normalized()
    }

    /// Sets `deselectable`.
    pub fn with_deselectable(mut self, deselectable: bool) -> Self {
        self.deselectable = deselectable;
        self.normalized()
    }

    /// Sets `keepable`.
    pub fn with_keepable(mut self, keepable: bool) -> Self {
        self.keepable = keepable;
        self
    }

    /// Applies the rules tying the flags together.
    pub fn normalized(mut self) -> Self {
        if self.display == SelectionDisplay::Check {
            self.multiple = true;
            self.deselectable = true;
        }
        self
    }

    /// Whether a leading checkbox column is reserved.
    pub fn has_check_column(&self) -> bool {
        self.selectable && self.display == SelectionDisplay::Check
    }
}

/// Outcome of a selection mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    /// Hashes newly selected.
    pub added: Vec<String>,
    /// Hashes no longer selected.
    pub removed: Vec<String>,
}

impl SelectionDelta {
    /// Whether the selection changed.
    pub fn is_changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    /// Folds a later delta into this one.
    pub fn extend(&mut self, other: SelectionDelta) {
        for hash in other.added {
            match self.removed.iter().position(|h| *h == hash) {
                Some(index) => {
                    self.removed.remove(index);
                }
                None => self.added.push(hash),
            }
        }
        for hash in other.removed {
            match self.added.iter().position(|h| *h == hash) {
                Some(index) => {
                    self.added.remove(index);
                }
                None => self.removed.push(hash),
            }
        }
    }
}

/// Selected records keyed by identity hash.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    config: SelectionConfig,
    selected: HashMap<String, Record>,
}

impl Selection {
    /// Creates an empty selection with normalized config.
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config: config.normalized(),
            selected: HashMap::new(),
        }
    }

    /// The normalized config.
    pub fn config(&self) -> SelectionConfig {
        self.config
    }

    /// Check if a record is selected.
    pub fn is_selected(&self, hash: &str) -> bool {
        self.selected.contains_key(hash)
    }

    /// Number of selected records.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected hashes.
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.selected.keys().map(String::as_str)
    }

    /// Selected records.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.selected.values()
    }

    /// Makes `record` the sole selection; no-op if it already is.
    pub fn select(&mut self, record: &Record) -> SelectionDelta {
        let hash = record.hash();
        if !self.config.selectable || (self.selected.len() == 1 && self.is_selected(hash)) {
            return SelectionDelta::default();
        }
        let was_selected = self.is_selected(hash);
        let mut delta = self.clear();
        delta.removed.retain(|h| h != hash);
        self.selected.insert(hash.to_string(), record.clone());
        if !was_selected {
            delta.added.push(hash.to_string());
        }
        delta
    }

    /// Adds `record`; replaces the selection when not `multiple`.
    pub fn add(&mut self, record: &Record) -> SelectionDelta {
        if !self.config.selectable || self.is_selected(record.hash()) {
            return SelectionDelta::default();
        }
        if !self.config.multiple {
            return self.select(record);
        }
        self.selected.insert(record.hash().to_string(), record.clone());
        SelectionDelta {
            added: vec![record.hash().to_string()],
            removed: Vec::new(),
        }
    }

    /// Removes a record.
    pub fn remove(&mut self, hash: &str) -> SelectionDelta {
        match self.selected.remove(hash) {
            Some(_) => SelectionDelta {
                added: Vec::new(),
                removed: vec![hash.to_string()],
            },
            None => SelectionDelta::default(),
        }
    }

    /// User toggle: selects, or deselects when `deselectable`.
    pub fn toggle(&mut self, record: &Record) -> SelectionDelta {
        if self.is_selected(record.hash()) {
            if self.config.deselectable {
                self.remove(record.hash())
            } else {
                SelectionDelta::default()
            }
        } else if self.config.multiple {
            self.add(record)
        } else {
            self.select(record)
        }
    }

    /// Removes everything.
    pub fn clear(&mut self) -> SelectionDelta {
        SelectionDelta {
            added: Vec::new(),
            removed: self.selected.drain().map(|(hash, _)| hash).collect(),
        }
    }

    /// Re-resolves every selected record against a new record set.
    ///
    /// Matched selections take the new record; unmatched ones are dropped.
    pub fn retain_matching(&mut self, records: &[Record]) -> SelectionDelta {
        let mut removed = Vec::new();
        let mut kept = HashMap::new();
        for (hash, _) in self.selected.drain() {
            match records.iter().find(|r| r.hash() == hash) {
                Some(record) => {
                    kept.insert(hash, record.clone());
                }
                None => removed.push(hash),
            }
        }
        self.selected = kept;
        SelectionDelta {
            added: Vec::new(),
            removed,
        }
    }
}
