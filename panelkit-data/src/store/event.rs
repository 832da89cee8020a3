//! Store events

use crate::events::Event;
use crate::source::LoadParams;

use super::StoreId;

/// Why the materialized records changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// Sorters changed.
    Sort,
    /// Filters changed.
    Filter,
    /// Rows were appended.
    Add,
    /// Records were re-derived on request.
    Refresh,
}

/// Notification emitted by a store.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// About to fetch. Returning `EventFlow::Cancel` aborts the load.
    BeforeLoad {
        /// Emitting store.
        store: StoreId,
        /// Parameters that will be sent to the source.
        params: LoadParams,
    },
    /// Records were loaded and materialized.
    Load {
        /// Emitting store.
        store: StoreId,
        /// Rows returned by the source.
        count: usize,
        /// Total rows on the source.
        total: usize,
    },
    /// Records were re-derived or appended.
    Update {
        /// Emitting store.
        store: StoreId,
        /// Number of materialized records.
        count: usize,
        /// Cause of the update.
        reason: UpdateReason,
    },
    /// The source failed; previous records are kept.
    LoadFailed {
        /// Emitting store.
        store: StoreId,
        /// Error text.
        message: String,
    },
}

/// Discriminant of [`StoreEvent`] used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEventKind {
    BeforeLoad,
    Load,
    Update,
    LoadFailed,
}

impl Event for StoreEvent {
    type Kind = StoreEventKind;

    fn kind(&self) -> StoreEventKind {
        match self {
            StoreEvent::BeforeLoad { .. } => StoreEventKind::BeforeLoad,
            StoreEvent::Load { .. } => StoreEventKind::Load,
            StoreEvent::Update { .. } => StoreEventKind::Update,
            StoreEvent::LoadFailed { .. } => StoreEventKind::LoadFailed,
        }
    }
}

impl StoreEvent {
    /// The emitting store.
    pub fn store(&self) -> StoreId {
        match self {
            StoreEvent::BeforeLoad { store, .. }
            | StoreEvent::Load { store, .. }
            | StoreEvent::Update { store, .. }
            | StoreEvent::LoadFailed { store, .. } => *store,
        }
    }
}
