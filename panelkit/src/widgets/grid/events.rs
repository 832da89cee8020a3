//! Grid events

use panelkit_data::events::Event;
use panelkit_data::model::Record;
use panelkit_data::query::Direction;

use super::GridId;

/// A focused cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPos {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub column: usize,
}

/// Notification emitted by a grid.
#[derive(Debug, Clone)]
pub enum GridEvent {
    /// The selection changed.
    SelectionChange {
        grid: GridId,
        /// Selected row indices, ascending.
        rows: Vec<usize>,
        /// Selected records.
        records: Vec<Record>,
    },
    /// A user interaction finished changing the selection.
    SelectionComplete {
        grid: GridId,
        rows: Vec<usize>,
        records: Vec<Record>,
    },
    /// The focused cell moved.
    FocusChange {
        grid: GridId,
        previous: Option<CellPos>,
        current: Option<CellPos>,
    },
    /// A row was opened (double click, activation).
    OpenItem {
        grid: GridId,
        row: usize,
        record: Record,
    },
    /// Context menu on a single row.
    OpenMenu {
        grid: GridId,
        row: usize,
        record: Record,
    },
    /// Context menu on a multi-row selection.
    OpenMenus {
        grid: GridId,
        rows: Vec<usize>,
        records: Vec<Record>,
    },
    /// A header requested a sort.
    Sort {
        grid: GridId,
        field: String,
        direction: Direction,
    },
}

/// Discriminant of [`GridEvent`] used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridEventKind {
    SelectionChange,
    SelectionComplete,
    FocusChange,
    OpenItem,
    OpenMenu,
    OpenMenus,
    Sort,
}

impl Event for GridEvent {
    type Kind = GridEventKind;

    fn kind(&self) -> GridEventKind {
        match self {
            GridEvent::SelectionChange { .. } => GridEventKind::SelectionChange,
            GridEvent::SelectionComplete { .. } => GridEventKind::SelectionComplete,
            GridEvent::FocusChange { .. } => GridEventKind::FocusChange,
            GridEvent::OpenItem { .. } => GridEventKind::OpenItem,
            GridEvent::OpenMenu { .. } => GridEventKind::OpenMenu,
            GridEvent::OpenMenus { .. } => GridEventKind::OpenMenus,
            GridEvent::Sort { .. } => GridEventKind::Sort,
        }
    }
}
