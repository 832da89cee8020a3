//! Grid engine.
//!
//! A [`Grid`] lays out a tree of columns over the records of a
//! [`DataStore`]: fixed and flexible widths, a pinned region on the left,
//! interactive resizing, cell focus and row selection. Rendering produces a
//! [`GridFrame`] the host paints.
//!
//! The grid listens to its store: a `load` re-resolves the selection
//! (keepable selections follow their records by identity hash, others are
//! reset) and any change resizes the scrollable body.

mod column;
mod config;
mod events;
mod focus;
mod layout;
mod render;
mod resize;

use std::any::Any;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::Weak;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

pub use column::*;
pub use config::*;
pub use events::*;
pub use layout::*;
pub use render::*;
pub use resize::*;

use panelkit_data::DataStore;
use panelkit_data::events::Emitter;
use panelkit_data::events::EventFlow;
use panelkit_data::events::ListenerId;
use panelkit_data::model::Record;
use panelkit_data::query::Direction;
use panelkit_data::query::Sorters;
use panelkit_data::store::StoreEventKind;
use panelkit_data::store::WeakStore;

use crate::registry::Component;
use crate::registry::ComponentKind;
use crate::registry::ComponentRegistry;
use crate::registry::Handle;
use crate::widgets::scroll::ScrollConfig;
use crate::widgets::scroll::ScrollController;
use crate::widgets::scroll::Size;
use crate::widgets::selection::Selection;
use crate::widgets::selection::SelectionDelta;
use crate::widgets::traits::Scrollable;
use crate::widgets::traits::Selectable;

/// Unique identifier for a grid instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridId(usize);

impl GridId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for GridId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__grid_{}", self.0)
    }
}

/// What [`Grid::update_layout`] touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutUpdate {
    /// Every column was rendered from scratch.
    pub full: bool,
    /// Columns whose width or visibility changed.
    pub changed: Vec<ColumnKey>,
    /// Unchanged ancestors of changed columns whose pinned chrome was
    /// refreshed.
    pub refreshed: Vec<ColumnKey>,
}

impl LayoutUpdate {
    /// Whether nothing was touched.
    pub fn is_empty(&self) -> bool {
        !self.full && self.changed.is_empty() && self.refreshed.is_empty()
    }
}

pub(crate) struct GridInner {
    config: GridConfig,
    columns: ColumnTree,
    layout: GridLayout,
    selection: Selection,
    focused: Option<CellPos>,
    viewport: Size,
    rendered: bool,
    resize: Option<ResizeSession>,
    listeners: Vec<ListenerId>,
    handle: Option<Handle>,
}

impl GridInner {
    fn relayout(&mut self) {
        self.layout = GridLayout::compute(&self.columns, self.config.freeze, self.viewport.width);
    }

    /// Width and visibility the model currently asks of a column.
    fn model_state(&self, key: ColumnKey) -> Rendered {
        let hidden = self.columns.is_hidden(key);
        let width = self.layout.header(key).map(|h| h.width).unwrap_or(0);
        Rendered { width, hidden }
    }

    /// Recomputes the layout and brings the rendered caches in line.
    fn reconcile(&mut self) -> LayoutUpdate {
        self.relayout();
        let keys: Vec<ColumnKey> = self.columns.keys().collect();

        if !self.rendered {
            for key in &keys {
                let state = self.model_state(*key);
                if let Some(column) = self.columns.get_mut(*key) {
                    column.rendered = Some(state);
                }
            }
            self.rendered = true;
            log::debug!("full layout of {} columns", keys.len());
            return LayoutUpdate {
                full: true,
                changed: keys,
                refreshed: Vec::new(),
            };
        }

        let mut changed = Vec::new();
        for key in &keys {
            let state = self.model_state(*key);
            if let Some(column) = self.columns.get_mut(*key)
                && column.rendered != Some(state)
            {
                column.rendered = Some(state);
                changed.push(*key);
            }
        }

        let mut refreshed = Vec::new();
        for key in &changed {
            for ancestor in self.columns.ancestors(*key) {
                if !changed.contains(&ancestor) && !refreshed.contains(&ancestor) {
                    refreshed.push(ancestor);
                }
            }
        }
        if !changed.is_empty() {
            log::debug!("layout update: {} changed, {} refreshed", changed.len(), refreshed.len());
        }
        LayoutUpdate {
            full: false,
            changed,
            refreshed,
        }
    }

    /// First visible leaf index, preferring data columns over the checkbox.
    fn default_column(&self) -> Option<usize> {
        let visible = |index: &usize| {
            self.columns
                .leaf(*index)
                .is_some_and(|key| !self.columns.is_hidden(key))
        };
        let first_data = (0..self.columns.leaves().len())
            .filter(visible)
            .find(|index| {
                self.columns
                    .leaf(*index)
                    .and_then(|key| self.columns.get(key))
                    .is_some_and(|c| !c.is_check())
            });
        first_data.or_else(|| (0..self.columns.leaves().len()).find(visible))
    }
}

/// Grid engine over a [`DataStore`].
///
/// Cheap to clone; clones share state.
///
/// # Example
///
/// ```
/// use panelkit::registry::ComponentRegistry;
/// use panelkit::widgets::grid::{ColumnConfig, Grid, GridConfig};
/// use panelkit::widgets::scroll::Size;
/// use panelkit_data::DataStore;
/// use panelkit_data::source::ArraySource;
/// use panelkit_data::store::StoreConfig;
///
/// let store = DataStore::new(StoreConfig::default(), ArraySource::new(Vec::new()));
/// let config = GridConfig::new(vec![
///     ColumnConfig::new("A", "a").with_width(100),
///     ColumnConfig::new("B", "b").with_min_width(50),
///     ColumnConfig::new("C", "c").with_width(80),
/// ])
/// .with_freeze(1);
///
/// let grid = Grid::new(config, store, &ComponentRegistry::new());
/// grid.set_viewport(Size::new(500, 300));
/// assert_eq!(grid.frozen_width(), 101);
/// ```
#[derive(Clone)]
pub struct Grid {
    id: GridId,
    inner: Arc<RwLock<GridInner>>,
    store: DataStore,
    scroll: ScrollController,
    events: Arc<Emitter<GridEvent>>,
    dirty: Arc<AtomicBool>,
    registry: ComponentRegistry,
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("id", &self.id)
            .field("store", &self.store.id())
            .finish_non_exhaustive()
    }
}

/// Non-owning grid handle held by store listeners.
struct WeakGrid {
    id: GridId,
    inner: Weak<RwLock<GridInner>>,
    store: WeakStore<Record>,
    scroll: ScrollController,
    events: Weak<Emitter<GridEvent>>,
    dirty: Arc<AtomicBool>,
    registry: ComponentRegistry,
}

impl WeakGrid {
    fn upgrade(&self) -> Option<Grid> {
        Some(Grid {
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

impl Grid {
    /// Creates a grid with the default scroll physics and registers it.
    pub fn new(config: GridConfig, store: DataStore, registry: &ComponentRegistry) -> Self {
        Self::with_scroll(config, store, ScrollController::new(ScrollConfig::default()), registry)
    }

    /// Creates a grid driving an existing scroll controller and registers
    /// it.
    pub fn with_scroll(
        config: GridConfig,
        store: DataStore,
        scroll: ScrollController,
        registry: &ComponentRegistry,
    ) -> Self {
        let selection = Selection::new(config.selection);
        let check_width = selection
            .config()
            .has_check_column()
            .then_some(config.check_column_width);
        let columns = ColumnTree::new(&config.columns, check_width);
        let header_count = columns.header_count();
        let freeze = clamp_freeze(config.freeze, header_count);
        if freeze != config.freeze {
            log::warn!(
                "freeze {} clamped to {freeze} for {header_count} headers",
                config.freeze
            );
        }

        let mut inner = GridInner {
            config,
            columns,
            layout: GridLayout::default(),
            selection,
            focused: None,
            viewport: Size::default(),
            rendered: false,
            resize: None,
            listeners: Vec::new(),
            handle: None,
        };
        inner.relayout();

        let grid = Self {
            id: GridId::new(),
            inner: Arc::new(RwLock::new(inner)),
            store,
            scroll,
            events: Arc::new(Emitter::new()),
            dirty: Arc::new(AtomicBool::new(true)),
            registry: registry.clone(),
        };

        let on_load = {
            let weak = grid.downgrade();
            grid.store.on(StoreEventKind::Load, move |_| {
                if let Some(grid) = weak.upgrade() {
                    grid.on_store_load();
                }
                EventFlow::Continue
            })
        };
        let on_update = {
            let weak = grid.downgrade();
            grid.store.on(StoreEventKind::Update, move |_| {
                if let Some(grid) = weak.upgrade() {
                    grid.on_store_update();
                }
                EventFlow::Continue
            })
        };

        let handle = registry.register(Arc::new(grid.clone()));
        if let Ok(mut guard) = grid.inner.write() {
            guard.listeners = vec![on_load, on_update];
            guard.handle = Some(handle);
        }
        grid.sync_scroll();
        grid
    }

    fn downgrade(&self) -> WeakGrid {
        WeakGrid {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
            store: self.store.downgrade(),
            scroll: self.scroll.clone(),
            events: Arc::downgrade(&self.events),
            dirty: Arc::clone(&self.dirty),
            registry: self.registry.clone(),
        }
    }

    /// Detaches from the store, stops autoscroll and leaves the registry.
    ///
    /// Returns `false` if the grid was already disposed.
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
        self.scroll.cancel_auto_scroll();
        if let Err(e) = self.registry.deregister(handle) {
            log::warn!("{}: {e}", self.id);
        }
        true
    }

    /// Get the unique ID.
    pub fn id(&self) -> GridId {
        self.id
    }

    /// Registry handle, `None` once disposed.
    pub fn handle(&self) -> Option<Handle> {
        self.inner.read().ok().and_then(|g| g.handle)
    }

    /// The backing store.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Scroll controller of the scrollable body.
    pub fn scroll_controller(&self) -> &ScrollController {
        &self.scroll
    }

    /// Registers a listener.
    pub fn on<F>(&self, kind: GridEventKind, listener: F) -> ListenerId
    where
        F: Fn(&GridEvent) -> EventFlow + Send + Sync + 'static,
    {
        self.events.on(kind, listener)
    }

    /// Removes a listener.
    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    fn emit(&self, event: GridEvent) {
        self.events.emit(&event);
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    // =========================================================================
    // Store reactions
    // =========================================================================

    fn on_store_load(&self) {
        self.resolve_selections();
        self.clamp_focus();
        self.sync_scroll();
        self.mark_dirty();
    }

    fn on_store_update(&self) {
        self.clamp_focus();
        self.sync_scroll();
        self.mark_dirty();
    }

    /// Sizes the scroll body: the viewport minus the pinned region and the
    /// header, over the scrollable column width and all rows.
    fn sync_scroll(&self) {
        let rows = self.store.count() as u32;
        let Some((viewport, content)) = self
            .inner
            .read()
            .map(|g| {
                let viewport = Size::new(
                    g.viewport.width.saturating_sub(g.layout.frozen_width),
                    g.viewport.height.saturating_sub(g.config.header_height),
                );
                let content = Size::new(g.layout.scroll_width, rows * g.config.row_height);
                (viewport, content)
            })
            .ok()
        else {
            return;
        };
        self.scroll.set_viewport(viewport);
        self.scroll.set_content(content);
    }

    // =========================================================================
    // Columns and layout
    // =========================================================================

    /// The column tree.
    pub fn columns(&self) -> ColumnTree {
        self.inner.read().map(|g| g.columns.clone()).unwrap_or_default()
    }

    /// A column by key.
    pub fn column(&self, key: ColumnKey) -> Option<Column> {
        self.inner.read().ok().and_then(|g| g.columns.get(key).cloned())
    }

    /// Key of the leaf at a column index.
    pub fn leaf(&self, index: usize) -> Option<ColumnKey> {
        self.inner.read().ok().and_then(|g| g.columns.leaf(index))
    }

    /// The current layout.
    pub fn layout(&self) -> GridLayout {
        self.inner.read().map(|g| g.layout.clone()).unwrap_or_default()
    }

    /// Grid size including header and pinned region.
    pub fn viewport(&self) -> Size {
        self.inner.read().map(|g| g.viewport).unwrap_or_default()
    }

    /// Resizes the grid; flexible columns follow.
    pub fn set_viewport(&self, viewport: Size) -> LayoutUpdate {
        if let Ok(mut guard) = self.inner.write() {
            guard.viewport = viewport;
        }
        self.update_layout()
    }

    /// Effective number of pinned headers.
    pub fn freeze(&self) -> usize {
        self.inner.read().map(|g| g.layout.freeze).unwrap_or(0)
    }

    /// Pins the first `freeze` headers, clamped to `header_count - 1`.
    pub fn set_freeze(&self, freeze: usize) -> LayoutUpdate {
        if let Ok(mut guard) = self.inner.write() {
            let clamped = clamp_freeze(freeze, guard.columns.header_count());
            if clamped != freeze {
                log::warn!("{}: freeze {freeze} clamped to {clamped}", self.id);
            }
            guard.config.freeze = clamped;
        }
        self.update_layout()
    }

    /// Width of the pinned region, one pixel of gap per pinned column
    /// included.
    pub fn frozen_width(&self) -> u32 {
        self.inner.read().map(|g| g.layout.frozen_width).unwrap_or(0)
    }

    /// Pinned column widths plus one pixel between each.
    pub fn frozen_span(&self) -> u32 {
        self.inner.read().map(|g| g.layout.frozen_span()).unwrap_or(0)
    }

    /// Recomputes widths, pinned offsets and sizing from the column models
    /// and re-renders only what changed.
    ///
    /// The first call renders every column. Afterwards a column is touched
    /// only when its width or visibility differs from what was last
    /// rendered, so a second call with no model change touches nothing.
    pub fn update_layout(&self) -> LayoutUpdate {
        let update = self
            .inner
            .write()
            .map(|mut g| g.reconcile())
            .unwrap_or_default();
        self.sync_scroll();
        if !update.is_empty() {
            self.mark_dirty();
        }
        update
    }

    /// Hides or shows a column (for groups, every leaf below it).
    ///
    /// Focus on a column that becomes hidden moves to the nearest visible
    /// one.
    pub fn set_column_hidden(&self, key: ColumnKey, hidden: bool) -> bool {
        let changed = self
            .inner
            .write()
            .map(|mut g| g.columns.set_hidden(key, hidden))
            .unwrap_or(false);
        if changed {
            self.update_layout();
            self.repair_focus_column();
        }
        changed
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Sorts by a column's sort field, toggling the direction.
    ///
    /// Ascending first, then the reverse of the store's current direction.
    /// Returns `false` for non-sortable columns.
    pub async fn sort_by_column(&self, key: ColumnKey) -> bool {
        let field = self.inner.read().ok().and_then(|g| {
            g.columns
                .get(key)
                .and_then(|c| c.sort_field().map(str::to_string))
        });
        let Some(field) = field else {
            return false;
        };
        let direction = self
            .store
            .sorters()
            .direction(&field)
            .map(Direction::reversed)
            .unwrap_or(Direction::Asc);
        log::debug!("{}: sort {field} {direction:?}", self.id);
        self.emit(GridEvent::Sort {
            grid: self.id,
            field: field.clone(),
            direction,
        });
        self.store.sort(Sorters::new().then(field, direction)).await
    }

    fn spawn_sort(&self, key: ColumnKey) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let grid = self.clone();
                runtime.spawn(async move {
                    grid.sort_by_column(key).await;
                });
            }
            Err(_) => log::warn!("{}: header sort needs a tokio runtime", self.id),
        }
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Fires `openItem` for a row.
    pub fn open_item(&self, row: usize) -> bool {
        let Some(record) = self.store.get_at(row) else {
            return false;
        };
        self.emit(GridEvent::OpenItem {
            grid: self.id,
            row,
            record,
        });
        true
    }

    /// Fires `openMenus` when the row is part of a multi-row selection,
    /// `openMenu` otherwise.
    pub fn open_menu(&self, row: usize) -> bool {
        let Some(record) = self.store.get_at(row) else {
            return false;
        };
        let rows = self.selected_rows();
        if rows.len() > 1 && rows.contains(&row) {
            let records = rows.iter().filter_map(|r| self.store.get_at(*r)).collect();
            self.emit(GridEvent::OpenMenus {
                grid: self.id,
                rows,
                records,
            });
        } else {
            self.emit(GridEvent::OpenMenu {
                grid: self.id,
                row,
                record,
            });
        }
        true
    }

    /// User click on a cell: focuses it, then selects the row.
    ///
    /// `toggle` (Ctrl held, or a click on the checkbox column) toggles the
    /// row instead of making it the sole selection.
    pub fn click_cell(&self, cell: CellPos, toggle: bool) -> bool {
        let Some(record) = self.store.get_at(cell.row) else {
            return false;
        };
        self.focus_cell(cell);
        let on_check = self
            .inner
            .read()
            .ok()
            .and_then(|g| g.columns.leaf(cell.column).and_then(|k| g.columns.get(k).map(Column::is_check)))
            .unwrap_or(false);
        let delta = self
            .with_selection(|s| {
                if toggle || on_check {
                    s.toggle(&record)
                } else {
                    s.select(&record)
                }
            })
            .unwrap_or_default();
        self.notify_selection(&delta, true)
    }
}

// =============================================================================
// Capability traits
// =============================================================================

impl Scrollable for Grid {
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

impl Selectable for Grid {
    fn with_selection<T>(&self, f: impl FnOnce(&mut Selection) -> T) -> Option<T> {
        self.inner.write().ok().map(|mut g| f(&mut g.selection))
    }

    fn row_records(&self) -> Vec<Record> {
        self.store.records()
    }

    fn row_record(&self, row: usize) -> Option<Record> {
        self.store.get_at(row)
    }

    fn notify_selection(&self, delta: &SelectionDelta, complete: bool) -> bool {
        if !delta.is_changed() {
            return false;
        }
        self.mark_dirty();
        let rows = self.selected_rows();
        let records = self.selected_records();
        log::trace!(
            "{}: selection +{} -{}",
            self.id,
            delta.added.len(),
            delta.removed.len()
        );
        self.emit(GridEvent::SelectionChange {
            grid: self.id,
            rows: rows.clone(),
            records: records.clone(),
        });
        if complete {
            self.emit(GridEvent::SelectionComplete {
                grid: self.id,
                rows,
                records,
            });
        }
        true
    }
}

impl Component for Grid {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Grid
    }

    fn name(&self) -> String {
        self.id.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
