//! Hierarchical store operations

use std::sync::Arc;

use super::Store;
use super::StoreConfig;
use super::StoreRecord;
use super::UpdateReason;
use crate::model::Children;
use crate::model::Record;
use crate::model::TreeRecord;
use crate::query::FilterSet;
use crate::query::Sorters;
use crate::source::Row;

impl StoreRecord for TreeRecord {
    fn from_row(row: Row, config: &StoreConfig, primary_keys: Arc<[String]>) -> Self {
        TreeRecord::from_row(row, &config.fields, primary_keys, &config.children_field)
    }

    fn record(&self) -> &Record {
        TreeRecord::record(self)
    }

    /// Sorts every level independently.
    fn sorted(records: Vec<Self>, sorters: &Sorters) -> Vec<Self> {
        let mut records: Vec<TreeRecord> = records
            .into_iter()
            .map(|mut node| {
                if let Children::Loaded(children) = node.children().clone() {
                    node.set_children(Children::Loaded(Self::sorted(children, sorters)));
                }
                node
            })
            .collect();
        records.sort_by(|a, b| sorters.compare(a.record(), b.record()));
        records
    }

    /// Keeps matching nodes with their subtrees, and ancestors of matching
    /// nodes with only the matching branches.
    fn filtered(records: &[Self], filters: &mut FilterSet) -> Vec<Self> {
        records
            .iter()
            .filter_map(|node| {
                if filters.matches(node.record()) {
                    return Some(node.clone());
                }
                let kept = Self::filtered(node.children().as_slice(), filters);
                if kept.is_empty() {
                    return None;
                }
                let mut node = node.clone();
                node.set_children(Children::Loaded(kept));
                Some(node)
            })
            .collect()
    }
}

impl Store<TreeRecord> {
    /// Descends through the materialized tree by child indices.
    ///
    /// Returns `None` for an empty path or any out-of-range index.
    pub fn get(&self, path: &[usize]) -> Option<TreeRecord> {
        self.with_records(|roots| {
            let (first, rest) = path.split_first()?;
            let mut node = roots.get(*first)?;
            for index in rest {
                node = node.children().as_slice().get(*index)?;
            }
            Some(node.clone())
        })
        .flatten()
    }

    /// Depth-first search for the first node with the same identity as
    /// `record`, returning its path.
    pub fn match_index(&self, record: &Record) -> Option<Vec<usize>> {
        let hash = record.hash().to_string();
        self.find_path(|candidate| candidate.hash() == hash)
    }

    /// Depth-first search for the first node whose record satisfies
    /// `predicate`, returning its path.
    pub fn find_path<F>(&self, predicate: F) -> Option<Vec<usize>>
    where
        F: Fn(&Record) -> bool,
    {
        self.with_records(|roots| {
            let mut path = Vec::new();
            search(roots, &predicate, &mut path).then_some(path)
        })
        .flatten()
    }
}

impl Store<TreeRecord> {
    /// Replaces the children of the node with `record`'s identity,
    /// typically after a `Pending` node was expanded.
    ///
    /// Rows are coerced like loaded rows. Returns `false` if no node
    /// matches.
    pub fn set_children(&self, record: &Record, rows: Vec<Row>) -> bool {
        let replaced = self
            .inner
            .write()
            .map(|mut inner| {
                let children: Vec<TreeRecord> = rows
                    .into_iter()
                    .map(|row| <TreeRecord as StoreRecord>::from_row(row, &inner.config, Arc::clone(&inner.primary_keys)))
                    .collect();
                let replaced = replace_children(&mut inner.original, record.hash(), Children::Loaded(children));
                if replaced {
                    inner.applied = None;
                    inner.reconcile();
                }
                replaced
            })
            .unwrap_or(false);
        if replaced {
            self.emit_update(UpdateReason::Refresh);
        } else {
            log::debug!("{}: no node {} to attach children to", self.id, record.hash());
        }
        replaced
    }
}

fn replace_children(nodes: &mut [TreeRecord], hash: &str, children: Children) -> bool {
    let mut children = Some(children);
    replace_in(nodes, hash, &mut children)
}

fn replace_in(nodes: &mut [TreeRecord], hash: &str, children: &mut Option<Children>) -> bool {
    for node in nodes.iter_mut() {
        if node.hash() == hash {
            if let Some(children) = children.take() {
                node.set_children(children);
            }
            return true;
        }
        if let Children::Loaded(mut kids) = node.children().clone()
            && replace_in(&mut kids, hash, children)
        {
            node.set_children(Children::Loaded(kids));
            return true;
        }
    }
    false
}

fn search<F>(nodes: &[TreeRecord], predicate: &F, path: &mut Vec<usize>) -> bool
where
    F: Fn(&Record) -> bool,
{
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        if predicate(node.record()) || search(node.children().as_slice(), predicate, path) {
            return true;
        }
        path.pop();
    }
    false
}
