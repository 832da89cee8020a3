//! Record stores.
//!
//! A [`Store`] owns the records last loaded from its [`DataSource`]
//! (`original_records`) and the materialized view derived from them by the
//! active filters and sorters (`records`). [`DataStore`] holds flat
//! [`Record`]s, [`TreeDataStore`] holds [`TreeRecord`]s.
//!
//! Stores are cheap to clone; clones share state.

mod config;
mod event;
mod tree;

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

pub use config::*;
pub use event::*;
pub use tree::*;

use crate::error::LoadError;
use crate::events::Emitter;
use crate::events::EventFlow;
use crate::events::ListenerId;
use crate::model::Record;
use crate::model::TreeRecord;
use crate::query::FilterSet;
use crate::query::Filters;
use crate::query::Sorters;
use crate::source::DataSource;
use crate::source::LoadParams;
use crate::source::LoadResult;
use crate::source::Row;

/// Unique identifier for a store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(usize);

impl StoreId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__store_{}", self.0)
    }
}

/// A record type a [`Store`] can hold.
pub trait StoreRecord: Clone + Send + Sync + 'static {
    /// Builds a record from a raw row, applying the declared field types.
    fn from_row(row: Row, config: &StoreConfig, primary_keys: Arc<[String]>) -> Self;

    /// The flat record carrying this item's data.
    fn record(&self) -> &Record;

    /// Stable sort by the sorters.
    fn sorted(mut records: Vec<Self>, sorters: &Sorters) -> Vec<Self> {
        records.sort_by(|a, b| sorters.compare(a.record(), b.record()));
        records
    }

    /// Keeps the records passing every filter, in order.
    fn filtered(records: &[Self], filters: &mut FilterSet) -> Vec<Self> {
        records
            .iter()
            .filter(|r| filters.matches(r.record()))
            .cloned()
            .collect()
    }
}

impl StoreRecord for Record {
    fn from_row(row: Row, config: &StoreConfig, primary_keys: Arc<[String]>) -> Self {
        Record::from_row(row, &config.fields, primary_keys)
    }

    fn record(&self) -> &Record {
        self
    }
}

/// Flat record store.
pub type DataStore = Store<Record>;

/// Hierarchical record store.
pub type TreeDataStore = Store<TreeRecord>;

/// Filters and sorters the current `records` were derived with.
#[derive(Debug, Clone, Default, PartialEq)]
struct Derivation {
    filters: Filters,
    sorters: Sorters,
}

struct StoreInner<R> {
    config: StoreConfig,
    primary_keys: Arc<[String]>,
    original: Vec<R>,
    records: Vec<R>,
    sorters: Sorters,
    filters: Filters,
    applied: Option<Derivation>,
    loading: bool,
    loaded: bool,
    page: usize,
    total: usize,
    count: usize,
    seq: u64,
    last_error: Option<Arc<LoadError>>,
}

impl<R: StoreRecord> StoreInner<R> {
    fn requested(&self) -> Derivation {
        Derivation {
            filters: self.filters.clone(),
            sorters: self.sorters.clone(),
        }
    }

    /// Re-derives `records` from `original` until it reflects the
    /// requested filters and sorters.
    fn reconcile(&mut self) {
        while self.applied.as_ref() != Some(&self.requested()) {
            let wanted = self.requested();

            let mut records = if self.config.remote_filter || wanted.filters.is_empty() {
                self.original.clone()
            } else {
                let mut set = wanted.filters.compile();
                R::filtered(&self.original, &mut set)
            };
            if !self.config.remote_sort && !wanted.sorters.is_empty() {
                records = R::sorted(records, &wanted.sorters);
            }

            self.records = records;
            self.applied = Some(wanted);
        }
    }

    fn params(&self) -> LoadParams {
        let limit = self.config.limit;
        LoadParams {
            fields: self.config.field_names(),
            start: if limit > 0 { (self.page.saturating_sub(1)) * limit } else { 0 },
            limit,
            sorters: (self.config.remote_sort && !self.sorters.is_empty())
                .then(|| self.sorters.clone()),
            filters: (self.config.remote_filter && !self.filters.is_empty())
                .then(|| self.filters.clone()),
            extra: self.config.params.clone(),
        }
    }
}

/// Record store backed by a [`DataSource`].
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use panelkit_data::query::Sorters;
/// use panelkit_data::source::ArraySource;
/// use panelkit_data::store::{DataStore, StoreConfig};
/// use serde_json::json;
///
/// let source = ArraySource::from_json(json!([
///     {"id": 1, "name": "b"},
///     {"id": 2, "name": "a"},
/// ]));
/// let store = DataStore::new(StoreConfig::default().with_primary_keys(["id"]), source);
/// store.load().await;
/// store.sort(Sorters::asc("name")).await;
/// assert_eq!(store.get_at(0).unwrap().get_int("id").unwrap(), Some(2));
/// # }
/// ```
pub struct Store<R> {
    id: StoreId,
    inner: Arc<RwLock<StoreInner<R>>>,
    source: Arc<dyn DataSource>,
    events: Arc<Emitter<StoreEvent>>,
}

impl<R> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            source: Arc::clone(&self.source),
            events: Arc::clone(&self.events),
        }
    }
}

impl<R> std::fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("id", &self.id).finish_non_exhaustive()
    }
}

impl<R> Store<R> {
    /// A handle that does not keep the store alive.
    ///
    /// Listeners registered on the store itself should capture this
    /// instead of a clone, or the store can never be dropped.
    pub fn downgrade(&self) -> WeakStore<R> {
        WeakStore {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
            source: Arc::clone(&self.source),
            events: Arc::downgrade(&self.events),
        }
    }
}

/// Non-owning handle to a [`Store`].
pub struct WeakStore<R> {
    id: StoreId,
    inner: std::sync::Weak<RwLock<StoreInner<R>>>,
    source: Arc<dyn DataSource>,
    events: std::sync::Weak<Emitter<StoreEvent>>,
}

impl<R> Clone for WeakStore<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: self.inner.clone(),
            source: Arc::clone(&self.source),
            events: self.events.clone(),
        }
    }
}

impl<R> WeakStore<R> {
    /// The store, if any strong handle is still alive.
    pub fn upgrade(&self) -> Option<Store<R>> {
        Some(Store {
            id: self.id,
            inner: self.inner.upgrade()?,
            source: Arc::clone(&self.source),
            events: self.events.upgrade()?,
        })
    }
}

impl<R: StoreRecord> Store<R> {
    /// Creates an empty store reading from `source`.
    pub fn new(config: StoreConfig, source: impl DataSource + 'static) -> Self {
        Self::with_source(config, Arc::new(source))
    }

    /// Creates an empty store reading from a shared source.
    pub fn with_source(config: StoreConfig, source: Arc<dyn DataSource>) -> Self {
        let inner = StoreInner {
            primary_keys: config.primary_keys_arc(),
            sorters: config.sorters.clone(),
            filters: config.filters.clone(),
            config,
            original: Vec::new(),
            records: Vec::new(),
            applied: None,
            loading: false,
            loaded: false,
            page: 1,
            total: 0,
            count: 0,
            seq: 0,
            last_error: None,
        };
        Self {
            id: StoreId::new(),
            inner: Arc::new(RwLock::new(inner)),
            source,
            events: Arc::new(Emitter::new()),
        }
    }

    /// Returns the store's unique ID.
    pub fn id(&self) -> StoreId {
        self.id
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Registers a listener.
    pub fn on<F>(&self, kind: StoreEventKind, listener: F) -> ListenerId
    where
        F: Fn(&StoreEvent) -> EventFlow + Send + Sync + 'static,
    {
        self.events.on(kind, listener)
    }

    /// Removes a listener.
    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    fn emit_update(&self, reason: UpdateReason) {
        let count = self.count();
        self.events.emit(&StoreEvent::Update {
            store: self.id,
            count,
            reason,
        });
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads the store once.
    ///
    /// An already loaded store re-emits `Load` and returns `true`; a store
    /// with a load in flight does nothing and returns `false`.
    pub async fn load(&self) -> bool {
        let settled = self
            .inner
            .read()
            .map(|inner| {
                if inner.loaded {
                    Some(Some((inner.count, inner.total)))
                } else if inner.loading {
                    Some(None)
                } else {
                    None
                }
            })
            .unwrap_or(Some(None));

        match settled {
            Some(Some((count, total))) => {
                self.events.emit(&StoreEvent::Load {
                    store: self.id,
                    count,
                    total,
                });
                true
            }
            Some(None) => false,
            None => self.fetch(None).await,
        }
    }

    /// Forces a fresh load, superseding any load in flight.
    pub async fn reload(&self) -> bool {
        self.fetch(None).await
    }

    /// Loads a page (1-based). Requires a non-zero `limit`.
    pub async fn load_page(&self, page: usize) -> bool {
        let previous = match self.inner.write() {
            Ok(mut inner) => std::mem::replace(&mut inner.page, page.max(1)),
            Err(_) => return false,
        };
        self.fetch(Some(previous)).await
    }

    /// Emits `BeforeLoad` and, unless a listener cancels, starts a request.
    /// A cancelled load puts `previous_page` back and leaves the loaded
    /// state as it was.
    async fn fetch(&self, previous_page: Option<usize>) -> bool {
        let Some(params) = self.inner.read().ok().map(|inner| inner.params()) else {
            return false;
        };

        let flow = self.events.emit(&StoreEvent::BeforeLoad {
            store: self.id,
            params: params.clone(),
        });
        if flow.is_cancelled() {
            log::debug!("{}: load cancelled by listener", self.id);
            if let Ok(mut inner) = self.inner.write() {
                if let Some(page) = previous_page {
                    inner.page = page;
                }
                inner.last_error = Some(Arc::new(LoadError::Cancelled));
            }
            return false;
        }

        let seq = match self.inner.write() {
            Ok(mut inner) => {
                inner.loaded = false;
                inner.loading = true;
                inner.seq += 1;
                inner.seq
            }
            Err(_) => return false,
        };

        log::debug!("{}: loading (request {seq}, start {}, limit {})", self.id, params.start, params.limit);
        let result = self.source.fetch(&params).await;
        self.settle(seq, result)
    }

    fn settle(&self, seq: u64, result: Result<LoadResult, LoadError>) -> bool {
        let outcome = {
            let Ok(mut inner) = self.inner.write() else {
                return false;
            };
            if inner.seq != seq {
                log::debug!("{}: discarding superseded response {seq} (latest {})", self.id, inner.seq);
                return false;
            }
            inner.loading = false;

            match result {
                Ok(result) => {
                    let primary_keys = Arc::clone(&inner.primary_keys);
                    let total = result.total();
                    let original: Vec<R> = result
                        .into_rows()
                        .into_iter()
                        .map(|row| R::from_row(row, &inner.config, Arc::clone(&primary_keys)))
                        .collect();

                    inner.count = original.len();
                    inner.total = total.unwrap_or(original.len());
                    inner.original = original;
                    inner.applied = None;
                    inner.reconcile();
                    inner.loaded = true;
                    inner.last_error = None;
                    Ok((inner.count, inner.total))
                }
                Err(e) => {
                    inner.loaded = false;
                    let message = e.to_string();
                    inner.last_error = Some(Arc::new(e));
                    Err(message)
                }
            }
        };

        match outcome {
            Ok((count, total)) => {
                log::debug!("{}: loaded {count} of {total} rows", self.id);
                self.events.emit(&StoreEvent::Load {
                    store: self.id,
                    count,
                    total,
                });
                true
            }
            Err(message) => {
                log::error!("{}: load failed: {message}", self.id);
                self.events.emit(&StoreEvent::LoadFailed {
                    store: self.id,
                    message,
                });
                false
            }
        }
    }

    // =========================================================================
    // Sorting and filtering
    // =========================================================================

    /// Replaces the sorters.
    ///
    /// Locally the records are re-derived with a stable sort; with
    /// `remote_sort` the store reloads instead.
    pub async fn sort(&self, sorters: Sorters) -> bool {
        let remote = match self.inner.write() {
            Ok(mut inner) => {
                inner.sorters = sorters;
                if !inner.config.remote_sort {
                    inner.reconcile();
                }
                inner.config.remote_sort
            }
            Err(_) => return false,
        };

        if remote {
            return self.reload().await;
        }
        self.emit_update(UpdateReason::Sort);
        true
    }

    /// Replaces the filters.
    ///
    /// Locally the records are re-derived from `original_records`; with
    /// `remote_filter` the store reloads instead.
    pub async fn filter(&self, filters: Filters) -> bool {
        let remote = match self.inner.write() {
            Ok(mut inner) => {
                inner.filters = filters;
                if !inner.config.remote_filter {
                    inner.reconcile();
                }
                inner.config.remote_filter
            }
            Err(_) => return false,
        };

        if remote {
            return self.reload().await;
        }
        self.emit_update(UpdateReason::Filter);
        true
    }

    /// Appends rows to `original_records`.
    ///
    /// The materialized records are not re-derived; call
    /// [`update`](Self::update) for that.
    pub fn add(&self, rows: Vec<Row>) -> usize {
        let added = match self.inner.write() {
            Ok(mut inner) => {
                let primary_keys = Arc::clone(&inner.primary_keys);
                let records: Vec<R> = rows
                    .into_iter()
                    .map(|row| R::from_row(row, &inner.config, Arc::clone(&primary_keys)))
                    .collect();
                let added = records.len();
                inner.original.extend(records);
                inner.total += added;
                added
            }
            Err(_) => return 0,
        };
        self.emit_update(UpdateReason::Add);
        added
    }

    /// Re-derives `records` from `original_records`.
    pub fn update(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.applied = None;
            inner.reconcile();
        }
        self.emit_update(UpdateReason::Refresh);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The materialized records.
    pub fn records(&self) -> Vec<R> {
        self.inner.read().map(|inner| inner.records.clone()).unwrap_or_default()
    }

    /// The records as last loaded plus appended ones.
    pub fn original_records(&self) -> Vec<R> {
        self.inner.read().map(|inner| inner.original.clone()).unwrap_or_default()
    }

    /// Runs a closure over the materialized records without cloning them.
    pub fn with_records<T>(&self, f: impl FnOnce(&[R]) -> T) -> Option<T> {
        self.inner.read().ok().map(|inner| f(&inner.records))
    }

    /// The materialized record at `index`.
    pub fn get_at(&self, index: usize) -> Option<R> {
        self.inner.read().ok().and_then(|inner| inner.records.get(index).cloned())
    }

    /// Position of the record with the given identity hash.
    pub fn index_of(&self, hash: &str) -> Option<usize> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.records.iter().position(|r| r.record().hash() == hash))
    }

    /// Number of materialized records.
    pub fn count(&self) -> usize {
        self.inner.read().map(|inner| inner.records.len()).unwrap_or(0)
    }

    /// Rows returned by the last load.
    pub fn loaded_count(&self) -> usize {
        self.inner.read().map(|inner| inner.count).unwrap_or(0)
    }

    /// Total rows on the source.
    pub fn total(&self) -> usize {
        self.inner.read().map(|inner| inner.total).unwrap_or(0)
    }

    /// Current page (1-based).
    pub fn page(&self) -> usize {
        self.inner.read().map(|inner| inner.page).unwrap_or(1)
    }

    /// Page size, `0` when not paged.
    pub fn limit(&self) -> usize {
        self.inner.read().map(|inner| inner.config.limit).unwrap_or(0)
    }

    /// Number of pages, at least 1.
    pub fn page_count(&self) -> usize {
        let (total, limit) = self
            .inner
            .read()
            .map(|inner| (inner.total, inner.config.limit))
            .unwrap_or((0, 0));
        if limit == 0 { 1 } else { total.div_ceil(limit).max(1) }
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.read().map(|inner| inner.loading).unwrap_or(false)
    }

    /// Whether the store has settled a load.
    pub fn is_loaded(&self) -> bool {
        self.inner.read().map(|inner| inner.loaded).unwrap_or(false)
    }

    /// The active sorters.
    pub fn sorters(&self) -> Sorters {
        self.inner.read().map(|inner| inner.sorters.clone()).unwrap_or_default()
    }

    /// The active filters.
    pub fn filters(&self) -> Filters {
        self.inner.read().map(|inner| inner.filters.clone()).unwrap_or_default()
    }

    /// Whether sorting is delegated to the source.
    pub fn is_remote_sort(&self) -> bool {
        self.inner.read().map(|inner| inner.config.remote_sort).unwrap_or(false)
    }

    /// The error of the last failed load, cleared by a successful one.
    pub fn last_error(&self) -> Option<Arc<LoadError>> {
        self.inner.read().ok().and_then(|inner| inner.last_error.clone())
    }

    /// Parameters the next load would send.
    pub fn load_params(&self) -> LoadParams {
        self.inner.read().map(|inner| inner.params()).unwrap_or_default()
    }
}
