//! List engine - a virtualized selectable list over a [`DataStore`].
//!
//! Rows have a fixed height; only the rows intersecting the viewport are
//! rendered. Focus, selection and scrolling behave like a single-column
//! grid.

use std::any::Any;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::Weak;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Instant;

use panelkit_data::DataStore;
use panelkit_data::events::Emitter;
use panelkit_data::events::Event;
use panelkit_data::events::EventFlow;
use panelkit_data::events::ListenerId;
use panelkit_data::model::Record;
use panelkit_data::store::StoreEventKind;
use panelkit_data::store::WeakStore;
use serde::Deserialize;
use serde::Serialize;

use super::events::EventResult;
use super::events::WidgetEvents;
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
use crate::input::KeyCombo;
use crate::input::Modifiers;
use crate::registry::Component;
use crate::registry::ComponentKind;
use crate::registry::ComponentRegistry;
use crate::registry::Handle;

/// Unique identifier for a list instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(usize);

impl ListId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__list_{}", self.0)
    }
}

/// Produces the text of a list item.
#[derive(Clone)]
pub struct ItemRenderer(Arc<dyn Fn(&Record) -> String + Send + Sync>);

impl ItemRenderer {
    /// Wraps a render function.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    /// Renders a record.
    pub fn render(&self, record: &Record) -> String {
        (self.0)(record)
    }
}

impl std::fmt::Debug for ItemRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ItemRenderer")
    }
}

/// Configuration of a [`List`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListConfig {
    /// Row height in pixels.
    ///
    /// Default: 24
    pub item_height: u32,
    /// Field shown when no renderer is set.
    ///
    /// Default: "text"
    pub display_field: String,
    /// Selection behavior.
    pub selection: SelectionConfig,
    /// Custom item renderer.
    #[serde(skip)]
    pub renderer: Option<ItemRenderer>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            item_height: 24,
            display_field: "text".to_string(),
            selection: SelectionConfig::default(),
            renderer: None,
        }
    }
}

impl ListConfig {
    /// Creates a list config showing `display_field`.
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

    /// Sets the selection behavior.
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection.normalized();
        self
    }

    /// Sets a custom item renderer.
    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(ItemRenderer::new(render));
        self
    }
}

/// Notification emitted by a list.
#[derive(Debug, Clone)]
pub enum ListEvent {
    SelectionChange {
        list: ListId,
        rows: Vec<usize>,
        records: Vec<Record>,
    },
    SelectionComplete {
        list: ListId,
        rows: Vec<usize>,
        records: Vec<Record>,
    },
    FocusChange {
        list: ListId,
        previous: Option<usize>,
        current: Option<usize>,
    },
    OpenItem {
        list: ListId,
        row: usize,
        record: Record,
    },
}

/// Discriminant of [`ListEvent`] used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListEventKind {
    SelectionChange,
    SelectionComplete,
    FocusChange,
    OpenItem,
}

impl Event for ListEvent {
    type Kind = ListEventKind;

    fn kind(&self) -> ListEventKind {
        match self {
            ListEvent::SelectionChange { .. } => ListEventKind::SelectionChange,
            ListEvent::SelectionComplete { .. } => ListEventKind::SelectionComplete,
            ListEvent::FocusChange { .. } => ListEventKind::FocusChange,
            ListEvent::OpenItem { .. } => ListEventKind::OpenItem,
        }
    }
}

/// A rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemFrame {
    pub index: usize,
    /// Top offset relative to the visible body.
    pub top: i32,
    pub text: String,
    pub selected: bool,
    pub focused: bool,
}

/// Everything the host needs to paint the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFrame {
    pub list: ListId,
    pub items: Vec<ListItemFrame>,
    pub item_height: u32,
    pub scroll: Point,
    pub track: Option<TrackGeometry>,
}

struct ListInner {
    config: ListConfig,
    selection: Selection,
    cursor: Option<usize>,
    listeners: Vec<ListenerId>,
    handle: Option<Handle>,
}

/// List engine over a [`DataStore`].
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct List {
    id: ListId,
    inner: Arc<RwLock<ListInner>>,
    store: DataStore,
    scroll: ScrollController,
    events: Arc<Emitter<ListEvent>>,
    dirty: Arc<AtomicBool>,
    registry: ComponentRegistry,
}

impl std::fmt::Debug for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("List")
            .field("id", &self.id)
            .field("store", &self.store.id())
            .finish_non_exhaustive()
    }
}

struct WeakList {
    id: ListId,
    inner: Weak<RwLock<ListInner>>,
    store: WeakStore<Record>,
    scroll: ScrollController,
    events: Weak<Emitter<ListEvent>>,
    dirty: Arc<AtomicBool>,
    registry: ComponentRegistry,
}

impl WeakList {
    fn upgrade(&self) -> Option<List> {
        Some(List {
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

impl List {
    /// Creates a list and registers it.
    pub fn new(config: ListConfig, store: DataStore, registry: &ComponentRegistry) -> Self {
        let inner = ListInner {
            selection: Selection::new(config.selection),
            config,
            cursor: None,
            listeners: Vec::new(),
            handle: None,
        };
        let list = Self {
            id: ListId::new(),
            inner: Arc::new(RwLock::new(inner)),
            store,
            scroll: ScrollController::new(ScrollConfig::default()),
            events: Arc::new(Emitter::new()),
            dirty: Arc::new(AtomicBool::new(true)),
            registry: registry.clone(),
        };

        let on_load = {
            let weak = list.downgrade();
            list.store.on(StoreEventKind::Load, move |_| {
                if let Some(list) = weak.upgrade() {
                    list.resolve_selections();
                    list.sync();
                }
                EventFlow::Continue
            })
        };
        let on_update = {
            let weak = list.downgrade();
            list.store.on(StoreEventKind::Update, move |_| {
                if let Some(list) = weak.upgrade() {
                    list.sync();
                }
                EventFlow::Continue
            })
        };

        let handle = registry.register(Arc::new(list.clone()));
        if let Ok(mut guard) = list.inner.write() {
            guard.listeners = vec![on_load, on_update];
            guard.handle = Some(handle);
        }
        list.sync();
        list
    }

    fn downgrade(&self) -> WeakList {
        WeakList {
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
    pub fn id(&self) -> ListId {
        self.id
    }

    /// The backing store.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Registers a listener.
    pub fn on<F>(&self, kind: ListEventKind, listener: F) -> ListenerId
    where
        F: Fn(&ListEvent) -> EventFlow + Send + Sync + 'static,
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

    /// Clamps the cursor and sizes the scroll content to the rows.
    fn sync(&self) {
        let count = self.store.count();
        let height = self.item_height();
        let width = self.scroll.viewport().width;
        self.scroll.set_content(Size::new(width, count as u32 * height));
        let stale = self.cursor().filter(|row| *row >= count);
        if stale.is_some() {
            if let Ok(mut guard) = self.inner.write() {
                guard.cursor = count.checked_sub(1);
            }
            self.events.emit(&ListEvent::FocusChange {
                list: self.id,
                previous: stale,
                current: count.checked_sub(1),
            });
        }
        self.mark_dirty();
    }

    /// Resizes the list.
    pub fn set_viewport(&self, viewport: Size) {
        self.scroll.set_viewport(viewport);
        self.sync();
    }

    /// Fires `openItem` for a row.
    pub fn open_item(&self, row: usize) -> bool {
        let Some(record) = self.store.get_at(row) else {
            return false;
        };
        self.events.emit(&ListEvent::OpenItem {
            list: self.id,
            row,
            record,
        });
        true
    }
}

impl Scrollable for List {
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

impl Focusable for List {
    fn cursor(&self) -> Option<usize> {
        self.inner.read().ok().and_then(|g| g.cursor)
    }

    fn set_cursor(&self, row: usize) -> Option<usize> {
        if row >= self.store.count() {
            return self.cursor();
        }
        let previous = self
            .inner
            .write()
            .ok()
            .and_then(|mut g| g.cursor.replace(row));
        if previous != Some(row) {
            self.mark_dirty();
            self.events.emit(&ListEvent::FocusChange {
                list: self.id,
                previous,
                current: Some(row),
            });
        }
        previous
    }

    fn item_count(&self) -> usize {
        self.store.count()
    }

    fn item_height(&self) -> u32 {
        self.inner.read().map(|g| g.config.item_height).unwrap_or(0)
    }
}

impl Selectable for List {
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
        self.events.emit(&ListEvent::SelectionChange {
            list: self.id,
            rows: rows.clone(),
            records: records.clone(),
        });
        if complete {
            self.events.emit(&ListEvent::SelectionComplete {
                list: self.id,
                rows,
                records,
            });
        }
        true
    }
}

impl Renderable for List {
    type Frame = ListFrame;

    fn render(&self) -> ListFrame {
        let scroll = self.scroll.position();
        let viewport = self.scroll.viewport();
        let items = self
            .inner
            .read()
            .ok()
            .and_then(|g| {
                let height = g.config.item_height;
                self.store.with_records(|records| {
                    let range = visible_range(scroll.y, viewport.height, height, records.len());
                    records[range.clone()]
                        .iter()
                        .zip(range)
                        .map(|(record, index)| ListItemFrame {
                            index,
                            top: (index as u32 * height) as i32 - scroll.y,
                            text: match &g.config.renderer {
                                Some(renderer) => renderer.render(record),
                                None => record.value(&g.config.display_field).to_string(),
                            },
                            selected: g.selection.is_selected(record.hash()),
                            focused: g.cursor == Some(index),
                        })
                        .collect()
                })
            })
            .unwrap_or_default();

        ListFrame {
            list: self.id,
            items,
            item_height: self.item_height(),
            scroll,
            track: self.scroll.track(Axis::Y),
        }
    }
}

impl WidgetEvents for List {
    fn on_click(&self, position: Point, modifiers: Modifiers) -> EventResult {
        let result = self.handle_track_press(position);
        if result.is_handled() {
            return result;
        }
        let Some(row) = self.index_at(position.y) else {
            return EventResult::Ignored;
        };
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

    fn on_double_click(&self, position: Point) -> EventResult {
        let opened = self.index_at(position.y).is_some_and(|row| self.open_item(row));
        EventResult::from_handled(opened)
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

    fn on_key(&self, key: KeyCombo) -> EventResult {
        if let Some(result) = self.handle_navigation_key(&key) {
            return result;
        }
        if let Some(result) = self.handle_selection_key(&key, self.cursor()) {
            return result;
        }
        EventResult::Ignored
    }
}

impl Component for List {
    fn kind(&self) -> ComponentKind {
        ComponentKind::List
    }

    fn name(&self) -> String {
        self.id.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
