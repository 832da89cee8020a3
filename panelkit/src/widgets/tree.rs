//! Tree engine - an expandable list over a [`TreeDataStore`].
//!
//! The tree renders a flattened view: root nodes plus the children of every
//! expanded node, depth-first. Expansion is tracked by identity hash, so it
//! survives sorting, filtering and reloads.
//!
//! Nodes whose children are [`Children::Pending`] can be expanded before
//! their children exist. The `expand` notification carries `pending: true`;
//! the host fetches the children and hands them to
//! [`TreeDataStore::set_children`], after which the expanded node shows them.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::Weak;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Instant;

use panelkit_data::TreeDataStore;
use panelkit_data::events::Emitter;
use panelkit_data::events::Event;
use panelkit_data::events::EventFlow;
use panelkit_data::events::ListenerId;
use panelkit_data::model::Children;
use panelkit_data::model::Record;
use panelkit_data::model::TreeRecord;
use panelkit_data::store::StoreEventKind;
use panelkit_data::store::WeakStore;
use serde::Deserialize;
use serde::Serialize;

use super::events::EventResult;
use super::events::WidgetEvents;
use super::list::ItemRenderer;
use super::render::Renderable;
use super::render::visible_range;
use super::scroll::Axis;
use super::scroll::Point;
use super::scroll::ScrollConfig;
use super::scroll::ScrollController;
use super::scroll::Size;
use super::scroll::TrackGeometry;
use super::scroll::WheelMode;
use super::selection::Selection;
use super::selection::SelectionConfig;
use super::selection::SelectionDelta;
use super::traits::Focusable;
use super::traits::Scrollable;
use super::traits::Selectable;
use crate::input::Key;
use crate::input::KeyCombo;
use crate::input::Modifiers;
use crate::registry::Component;
use crate::registry::ComponentKind;
use crate::registry::ComponentRegistry;
use crate::registry::Handle;

/// Unique identifier for a tree instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(usize);

impl TreeId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for TreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__tree_{}", self.0)
    }
}

/// Configuration of a [`Tree`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeConfig {
    /// Row height in pixels.
    ///
    /// Default: 24
    pub item_height: u32,
    /// Horizontal offset per depth level in pixels.
    ///
    /// Default: 16
    pub indent: u32,
    /// Field shown when no renderer is set.
    ///
    /// Default: "text"
    pub display_field: String,
    /// Selection behavior.
    pub selection: SelectionConfig,
    /// Custom node renderer.
    #[serde(skip)]
    pub renderer: Option<ItemRenderer>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            item_height: 24,
            indent: 16,
            display_field: "text".to_string(),
            selection: SelectionConfig::default(),
            renderer: None,
        }
    }
}

impl TreeConfig {
    /// Creates a tree config showing `display_field`.
    pub fn new(display_field: impl Into<String>) -> Self {
        Self {
            display_field: display_field.into(),
            ..Self::default()
        }
    }

    /// Sets the row height.
    pub fn with_item_height(mut self, height: u32) -> Self {
        self.item_height = height;
        self
    }

    /// Sets the per-level indent.
    pub fn with_indent(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the selection behavior.
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection.normalized();
        self
    }

    /// Sets a custom node renderer.
    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(ItemRenderer::new(render));
        self
    }
}

/// A visible node of the flattened tree.
#[derive(Debug, Clone)]
pub struct FlatNode {
    /// Child indices from the roots.
    pub path: Vec<usize>,
    /// 0 for roots.
    pub depth: usize,
    pub record: Record,
    /// Has, or claims to have, children.
    pub expandable: bool,
    pub expanded: bool,
    /// Children are not loaded yet.
    pub pending: bool,
}

/// Notification emitted by a tree.
#[derive(Debug, Clone)]
pub enum TreeEvent {
    SelectionChange {
        tree: TreeId,
        rows: Vec<usize>,
        records: Vec<Record>,
    },
    SelectionComplete {
        tree: TreeId,
        rows: Vec<usize>,
        records: Vec<Record>,
    },
    FocusChange {
        tree: TreeId,
        previous: Option<usize>,
        current: Option<usize>,
    },
    OpenItem {
        tree: TreeId,
        row: usize,
        record: Record,
    },
    /// A node was expanded. `pending` asks the host for its children.
    Expand {
        tree: TreeId,
        path: Vec<usize>,
        record: Record,
        pending: bool,
    },
    Collapse {
        tree: TreeId,
        path: Vec<usize>,
        record: Record,
    },
}

/// Discriminant of [`TreeEvent`] used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeEventKind {
    SelectionChange,
    SelectionComplete,
    FocusChange,
    OpenItem,
    Expand,
    Collapse,
}

impl Event for TreeEvent {
    type Kind = TreeEventKind;

    fn kind(&self) -> TreeEventKind {
        match self {
            TreeEvent::SelectionChange { .. } => TreeEventKind::SelectionChange,
            TreeEvent::SelectionComplete { .. } => TreeEventKind::SelectionComplete,
            TreeEvent::FocusChange { .. } => TreeEventKind::FocusChange,
            TreeEvent::OpenItem { .. } => TreeEventKind::OpenItem,
            TreeEvent::Expand { .. } => TreeEventKind::Expand,
            TreeEvent::Collapse { .. } => TreeEventKind::Collapse,
        }
    }
}

/// A rendered tree row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItemFrame {
    pub index: usize,
    /// Top offset relative to the visible body.
    pub top: i32,
    pub depth: usize,
    /// Left offset of the expander in pixels.
    pub indent: u32,
    pub text: String,
    pub expandable: bool,
    pub expanded: bool,
    pub pending: bool,
    pub selected: bool,
    pub focused: bool,
}

/// Everything the host needs to paint the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFrame {
    pub tree: TreeId,
    pub items: Vec<TreeItemFrame>,
    pub item_height: u32,
    pub scroll: Point,
    pub track: Option<TrackGeometry>,
}

struct TreeInner {
    config: TreeConfig,
    selection: Selection,
    cursor: Option<usize>,
    expanded: HashSet<String>,
    flat: Vec<FlatNode>,
    listeners: Vec<ListenerId>,
    handle: Option<Handle>,
}

/// Tree engine over a [`TreeDataStore`].
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Tree {
    id: TreeId,
    inner: Arc<RwLock<TreeInner>>,
    store: TreeDataStore,
    scroll: ScrollController,
    events: Arc<Emitter<TreeEvent>>,
    dirty: Arc<AtomicBool>,
    registry: ComponentRegistry,
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("id", &self.id)
            .field("store", &self.store.id())
            .finish_non_exhaustive()
    }
}

struct WeakTree {
    id: TreeId,
    inner: Weak<RwLock<TreeInner>>,
    store: WeakStore<TreeRecord>,
    scroll: ScrollController,
    events: Weak<Emitter<TreeEvent>>,
    dirty: Arc<AtomicBool>,
    registry: ComponentRegistry,
}

impl WeakTree {
    fn upgrade(&self) -> Option<Tree> {
        Some(Tree {
            id: self.id,
            inner: self.inner.upgrade()?,
            store: self.store.upgrade()?,
            scroll: self.scroll.clone(),
            events: self.events.upgrade()?,
            dirty: Arc::clone(&self.dirty),
            registry: self.registry.clone(),
        })
    }
}

/// Depth-first flattening of the nodes reachable through expanded parents.
fn flatten(nodes: &[TreeRecord], expanded: &HashSet<String>, depth: usize, prefix: &[usize], out: &mut Vec<FlatNode>) {
    for (index, node) in nodes.iter().enumerate() {
        let mut path = prefix.to_vec();
        path.push(index);
        let is_expanded = expanded.contains(node.hash());
        let children = node.children();
        out.push(FlatNode {
            path: path.clone(),
            depth,
            record: node.record().clone(),
            expandable: children.has_children(),
            expanded: is_expanded,
            pending: matches!(children, Children::Pending),
        });
        if is_expanded {
            flatten(children.as_slice(), expanded, depth + 1, &path, out);
        }
    }
}

fn collect_records(nodes: &[TreeRecord], out: &mut Vec<Record>) {
    for node in nodes {
        out.push(node.record().clone());
        collect_records(node.children().as_slice(), out);
    }
}

impl Tree {
    /// Creates a tree and registers it.
    pub fn new(config: TreeConfig, store: TreeDataStore, registry: &ComponentRegistry) -> Self {
        let inner = TreeInner {
            selection: Selection::new(config.selection),
            config,
            cursor: None,
            expanded: HashSet::new(),
            flat: Vec::new(),
            listeners: Vec::new(),
            handle: None,
        };
        let tree = Self {
            id: TreeId::new(),
            inner: Arc::new(RwLock::new(inner)),
            store,
            scroll: ScrollController::new(ScrollConfig::default()),
            events: Arc::new(Emitter::new()),
            dirty: Arc::new(AtomicBool::new(true)),
            registry: registry.clone(),
        };

        let on_load = {
            let weak = tree.downgrade();
            tree.store.on(StoreEventKind::Load, move |_| {
                if let Some(tree) = weak.upgrade() {
                    tree.rebuild();
                    tree.resolve_selections();
                }
                EventFlow::Continue
            })
        };
        let on_update = {
            let weak = tree.downgrade();
            tree.store.on(StoreEventKind::Update, move |_| {
                if let Some(tree) = weak.upgrade() {
                    tree.rebuild();
                }
                EventFlow::Continue
            })
        };

        let handle = registry.register(Arc::new(tree.clone()));
        if let Ok(mut guard) = tree.inner.write() {
            guard.listeners = vec![on_load, on_update];
            guard.handle = Some(handle);
        }
        tree.rebuild();
        tree
    }

    fn downgrade(&self) -> WeakTree {
        WeakTree {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
            store: self.store.downgrade(),
            scroll: self.scroll.clone(),
            events: Arc::downgrade(&self.events),
            dirty: Arc::clone(&self.dirty),
            registry: self.registry.clone(),
        }
    }

    /// Detaches from the store and leaves the registry.
    pub fn dispose(&self) -> bool {
        let Some((listeners, handle)) = self
            .inner
            .write()
            .ok()
            .and_then(|mut g| g.handle.take().map(|h| (std::mem::take(&mut g.listeners), h)))
        else {
            return false;
        };
        for listener in listeners {
            self.store.off(listener);
        }
        if let Err(e) = self.registry.deregister(handle) {
            log::warn!("{}: {e}", self.id);
        }
        true
    }

    /// Get the unique ID.
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// The backing store.
    pub fn store(&self) -> &TreeDataStore {
        &self.store
    }

    /// Registers a listener.
    pub fn on<F>(&self, kind: TreeEventKind, listener: F) -> ListenerId
    where
        F: Fn(&TreeEvent) -> EventFlow + Send + Sync + 'static,
    {
        self.events.on(kind, listener)
    }

    /// Removes a listener.
    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Resizes the tree.
    pub fn set_viewport(&self, viewport: Size) {
        self.scroll.set_viewport(viewport);
        self.sync_scroll();
    }

    fn sync_scroll(&self) {
        let (rows, height) = self
            .inner
            .read()
            .map(|g| (g.flat.len() as u32, g.config.item_height))
            .unwrap_or((0, 0));
        let width = self.scroll.viewport().width;
        self.scroll.set_content(Size::new(width, rows * height));
    }

    /// Re-flattens the store's tree and keeps the cursor on an existing
    /// row.
    fn rebuild(&self) {
        let expanded = self
            .inner
            .read()
            .map(|g| g.expanded.clone())
            .unwrap_or_default();
        let flat = self
            .store
            .with_records(|roots| {
                let mut flat = Vec::new();
                flatten(roots, &expanded, 0, &[], &mut flat);
                flat
            })
            .unwrap_or_default();

        let moved = self.inner.write().ok().and_then(|mut g| {
            let count = flat.len();
            g.flat = flat;
            let stale = g.cursor.filter(|row| *row >= count)?;
            g.cursor = count.checked_sub(1);
            Some((stale, g.cursor))
        });
        if let Some((previous, current)) = moved {
            self.events.emit(&TreeEvent::FocusChange {
                tree: self.id,
                previous: Some(previous),
                current,
            });
        }
        self.sync_scroll();
        self.mark_dirty();
    }

    /// The visible nodes in row order.
    pub fn nodes(&self) -> Vec<FlatNode> {
        self.inner.read().map(|g| g.flat.clone()).unwrap_or_default()
    }

    /// The visible node at a row.
    pub fn node(&self, row: usize) -> Option<FlatNode> {
        self.inner.read().ok().and_then(|g| g.flat.get(row).cloned())
    }

    /// Row of the visible node with `record`'s identity.
    pub fn row_of(&self, record: &Record) -> Option<usize> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.flat.iter().position(|n| n.record.hash() == record.hash()))
    }

    /// Whether a row is expanded.
    pub fn is_expanded(&self, row: usize) -> bool {
        self.node(row).is_some_and(|n| n.expanded)
    }

    /// Expands a row. Returns `false` for leaves and expanded rows.
    pub fn expand(&self, row: usize) -> bool {
        let Some(node) = self.inner.write().ok().and_then(|mut g| {
            let node = g.flat.get(row).filter(|n| n.expandable && !n.expanded)?.clone();
            g.expanded.insert(node.record.hash().to_string());
            Some(node)
        }) else {
            return false;
        };
        self.rebuild();
        if node.pending {
            log::debug!("{}: expanding pending node {}", self.id, node.record.hash());
        }
        self.events.emit(&TreeEvent::Expand {
            tree: self.id,
            path: node.path,
            record: node.record,
            pending: node.pending,
        });
        true
    }

    /// Collapses a row. A cursor inside the collapsed subtree moves onto
    /// the row.
    pub fn collapse(&self, row: usize) -> bool {
        let Some((node, descendants)) = self.inner.write().ok().and_then(|mut g| {
            let node = g.flat.get(row).filter(|n| n.expanded)?.clone();
            let descendants = g.flat[row + 1..]
                .iter()
                .take_while(|n| n.depth > node.depth)
                .count();
            g.expanded.remove(node.record.hash());
            Some((node, descendants))
        }) else {
            return false;
        };
        let cursor = self.cursor();
        if let Some(current) = cursor
            && current > row
        {
            let target = if current <= row + descendants {
                row
            } else {
                current - descendants
            };
            if let Ok(mut guard) = self.inner.write() {
                guard.cursor = Some(target);
            }
            if target == row {
                self.events.emit(&TreeEvent::FocusChange {
                    tree: self.id,
                    previous: cursor,
                    current: Some(target),
                });
            }
        }
        self.rebuild();
        self.events.emit(&TreeEvent::Collapse {
            tree: self.id,
            path: node.path,
            record: node.record,
        });
        true
    }

    /// Expands a collapsed row or collapses an expanded one.
    pub fn toggle_expand(&self, row: usize) -> bool {
        if self.is_expanded(row) {
            self.collapse(row)
        } else {
            self.expand(row)
        }
    }

    /// Expands every node with loaded children.
    pub fn expand_all(&self) {
        let mut records = Vec::new();
        self.store.with_records(|roots| expand_loaded(roots, &mut records));
        if let Ok(mut guard) = self.inner.write() {
            guard.expanded.extend(records);
        }
        self.rebuild();
    }

    /// Collapses every node.
    pub fn collapse_all(&self) {
        let had_cursor = self.cursor();
        if let Ok(mut guard) = self.inner.write() {
            guard.expanded.clear();
            guard.cursor = None;
        }
        if had_cursor.is_some() {
            self.events.emit(&TreeEvent::FocusChange {
                tree: self.id,
                previous: had_cursor,
                current: None,
            });
        }
        self.rebuild();
    }

    /// Fires `openItem` for a row.
    pub fn open_item(&self, row: usize) -> bool {
        let Some(node) = self.node(row) else {
            return false;
        };
        self.events.emit(&TreeEvent::OpenItem {
            tree: self.id,
            row,
            record: node.record,
        });
        true
    }

    /// Row of the nearest visible ancestor.
    fn parent_row(&self, row: usize) -> Option<usize> {
        let guard = self.inner.read().ok()?;
        let depth = guard.flat.get(row)?.depth;
        (0..row).rev().find(|r| guard.flat[*r].depth < depth)
    }

    /// Whether a body-relative x falls on a row's expander.
    fn on_expander(&self, row: usize, x: i32) -> bool {
        let Some((node, indent)) = self
            .inner
            .read()
            .ok()
            .and_then(|g| g.flat.get(row).map(|n| (n.clone(), g.config.indent as i32)))
        else {
            return false;
        };
        let left = node.depth as i32 * indent;
        node.expandable && x >= left && x < left + indent
    }
}

fn expand_loaded(nodes: &[TreeRecord], out: &mut Vec<String>) {
    for node in nodes {
        if let Children::Loaded(children) = node.children()
            && !children.is_empty()
        {
            out.push(node.hash().to_string());
            expand_loaded(children, out);
        }
    }
}

impl Scrollable for Tree {
    fn id_string(&self) -> String {
        self.id.to_string()
    }

    fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl Focusable for Tree {
    fn cursor(&self) -> Option<usize> {
        self.inner.read().ok().and_then(|g| g.cursor)
    }

    fn set_cursor(&self, row: usize) -> Option<usize> {
        let Some(previous) = self.inner.write().ok().and_then(|mut g| {
            if row >= g.flat.len() {
                return None;
            }
            Some(g.cursor.replace(row))
        }) else {
            return self.cursor();
        };
        if previous != Some(row) {
            self.mark_dirty();
            self.events.emit(&TreeEvent::FocusChange {
                tree: self.id,
                previous,
                current: Some(row),
            });
        }
        previous
    }

    fn item_count(&self) -> usize {
        self.inner.read().map(|g| g.flat.len()).unwrap_or(0)
    }

    fn item_height(&self) -> u32 {
        self.inner.read().map(|g| g.config.item_height).unwrap_or(0)
    }
}

impl Selectable for Tree {
    fn with_selection<T>(&self, f: impl FnOnce(&mut Selection) -> T) -> Option<T> {
        self.inner.write().ok().map(|mut g| f(&mut g.selection))
    }

    fn row_records(&self) -> Vec<Record> {
        self.inner
            .read()
            .map(|g| g.flat.iter().map(|n| n.record.clone()).collect())
            .unwrap_or_default()
    }

    fn row_record(&self, row: usize) -> Option<Record> {
        self.node(row).map(|n| n.record)
    }

    fn notify_selection(&self, delta: &SelectionDelta, complete: bool) -> bool {
        if !delta.is_changed() {
            return false;
        }
        self.mark_dirty();
        let rows = self.selected_rows();
        let records = self.selected_records();
        self.events.emit(&TreeEvent::SelectionChange {
            tree: self.id,
            rows: rows.clone(),
            records: records.clone(),
        });
        if complete {
            self.events.emit(&TreeEvent::SelectionComplete {
                tree: self.id,
                rows,
                records,
            });
        }
        true
    }

    /// Keepable selections follow their records anywhere in the tree, not
    /// only among the visible rows.
    fn resolve_selections(&self) -> bool {
        let mut records = Vec::new();
        self.store.with_records(|roots| collect_records(roots, &mut records));
        let delta = self
            .with_selection(|s| {
                if s.config().keepable {
                    s.retain_matching(&records)
                } else {
                    s.clear()
                }
            })
            .unwrap_or_default();
        self.notify_selection(&delta, false)
    }
}

impl Renderable for Tree {
    type Frame = TreeFrame;

    fn render(&self) -> TreeFrame {
        let scroll = self.scroll.position();
        let viewport = self.scroll.viewport();
        let (items, item_height) = self
            .inner
            .read()
            .map(|g| {
                let height = g.config.item_height;
                let range = visible_range(scroll.y, viewport.height, height, g.flat.len());
                let items = g.flat[range.clone()]
                    .iter()
                    .zip(range)
                    .map(|(node, index)| TreeItemFrame {
                        index,
                        top: (index as u32 * height) as i32 - scroll.y,
                        depth: node.depth,
                        indent: node.depth as u32 * g.config.indent,
                        text: match &g.config.renderer {
                            Some(renderer) => renderer.render(&node.record),
                            None => node.record.value(&g.config.display_field).to_string(),
                        },
                        expandable: node.expandable,
                        expanded: node.expanded,
                        pending: node.pending,
                        selected: g.selection.is_selected(node.record.hash()),
                        focused: g.cursor == Some(index),
                    })
                    .collect();
                (items, height)
            })
            .unwrap_or_default();

        TreeFrame {
            tree: self.id,
            items,
            item_height,
            scroll,
            track: self.scroll.track(Axis::Y),
        }
    }
}

impl WidgetEvents for Tree {
    fn on_click(&self, position: Point, modifiers: Modifiers) -> EventResult {
        let result = self.handle_track_press(position);
        if result.is_handled() {
            return result;
        }
        let Some(row) = self.index_at(position.y) else {
            return EventResult::Ignored;
        };
        if self.on_expander(row, position.x) {
            return EventResult::from_handled(self.toggle_expand(row));
        }
        self.handle_cursor_move(row);
        let Some(record) = self.row_record(row) else {
            return EventResult::Ignored;
        };
        let delta = self
            .with_selection(|s| if modifiers.ctrl { s.toggle(&record) } else { s.select(&record) })
            .unwrap_or_default();
        self.notify_selection(&delta, true);
        EventResult::Consumed
    }

    /// Expandable rows toggle, leaves open.
    fn on_double_click(&self, position: Point) -> EventResult {
        let Some(row) = self.index_at(position.y) else {
            return EventResult::Ignored;
        };
        let handled = if self.node(row).is_some_and(|n| n.expandable) {
            self.toggle_expand(row)
        } else {
            self.open_item(row)
        };
        EventResult::from_handled(handled)
    }

    /// A press on a row also grabs the body for drag scrolling.
    fn on_press(&self, position: Point, modifiers: Modifiers, at: Instant) -> EventResult {
        let result = self.on_click(position, modifiers);
        if result == EventResult::Consumed && !self.is_on_track(position) {
            return self.handle_body_grab(position, at);
        }
        result
    }

    fn on_touch_start(&self, position: Point, at: Instant) -> EventResult {
        if self.is_on_track(position) {
            return EventResult::Ignored;
        }
        self.handle_touch_start(position, at)
    }

    fn on_drag(&self, position: Point, at: Instant) -> EventResult {
        if self.scroll.track_drag().is_some() {
            return self.handle_track_drag(position);
        }
        self.handle_touch_move(position, at)
    }

    fn on_release(&self, _position: Point, at: Instant) -> EventResult {
        if self.scroll.track_drag().is_some() {
            return self.handle_track_release();
        }
        self.handle_touch_end(at)
    }

    fn on_wheel(&self, delta_x: f64, delta_y: f64, mode: WheelMode) -> EventResult {
        self.handle_wheel(delta_x, delta_y, mode)
    }

    /// Right expands or steps into the first child, Left collapses or
    /// steps out to the parent.
    fn on_key(&self, key: KeyCombo) -> EventResult {
        let cursor = self.cursor();
        match (key.key, cursor.and_then(|row| self.node(row).map(|n| (row, n)))) {
            (Key::Right, Some((row, node))) => {
                let handled = if !node.expanded {
                    self.expand(row)
                } else if self.node(row + 1).is_some_and(|n| n.depth > node.depth) {
                    self.handle_cursor_move(row + 1)
                } else {
                    false
                };
                return EventResult::from_handled(handled);
            }
            (Key::Left, Some((row, node))) => {
                let handled = if node.expanded {
                    self.collapse(row)
                } else {
                    self.parent_row(row).is_some_and(|parent| self.handle_cursor_move(parent))
                };
                return EventResult::from_handled(handled);
            }
            _ => {}
        }
        if let Some(result) = self.handle_navigation_key(&key) {
            return result;
        }
        if let Some(result) = self.handle_selection_key(&key, cursor) {
            return result;
        }
        EventResult::Ignored
    }
}

impl Component for Tree {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Tree
    }

    fn name(&self) -> String {
        self.id.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
