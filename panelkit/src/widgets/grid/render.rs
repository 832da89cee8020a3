//! Grid frames.

use panelkit_data::model::Record;
use panelkit_data::query::Direction;

use super::Align;
use super::Cell;
use super::CellPos;
use super::ColumnKey;
use super::ColumnLayout;
use super::Grid;
use super::GridId;
use super::GridInner;
use super::LayoutUpdate;
use crate::widgets::render::Renderable;
use crate::widgets::render::visible_range;
use crate::widgets::scroll::Axis;
use crate::widgets::scroll::Point;
use crate::widgets::scroll::TrackGeometry;

/// A header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFrame {
    pub key: ColumnKey,
    pub text: String,
    /// Nesting depth, 0 for top-level headers.
    pub depth: usize,
    /// Left offset within its region.
    pub left: u32,
    pub width: u32,
    pub frozen: bool,
    /// Last pinned top-level header.
    pub end: bool,
    /// Active sort on the header's field.
    pub sort: Option<Direction>,
    pub resizable: bool,
}

/// A body cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFrame {
    /// Leaf column index.
    pub column: usize,
    /// Left offset within its region.
    pub left: u32,
    pub width: u32,
    pub text: String,
    pub align: Align,
    pub frozen: bool,
    pub focused: bool,
}

/// A body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFrame {
    /// Row index in the store's records.
    pub index: usize,
    /// Top offset relative to the visible body.
    pub top: i32,
    pub selected: bool,
    pub focused: bool,
    pub cells: Vec<CellFrame>,
}

/// Everything the host needs to paint the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFrame {
    pub grid: GridId,
    pub headers: Vec<HeaderFrame>,
    /// Visible rows only.
    pub rows: Vec<RowFrame>,
    pub frozen_width: u32,
    pub header_height: u32,
    pub row_height: u32,
    /// Scroll position of the body.
    pub scroll: Point,
    pub vertical: Option<TrackGeometry>,
    pub horizontal: Option<TrackGeometry>,
    /// Columns the layout pass touched.
    pub layout: LayoutUpdate,
}

impl Renderable for Grid {
    type Frame = GridFrame;

    /// Reconciles the layout and renders the visible rows and columns.
    fn render(&self) -> GridFrame {
        let layout = self.update_layout();
        let scroll = self.scroll.position();
        let body = self.scroll.viewport();
        let sorters = self.store.sorters();

        let (headers, rows, frozen_width, header_height, row_height) = self
            .inner
            .read()
            .map(|g| {
                let headers = render_headers(&g, |field| sorters.direction(field));
                let columns: Vec<ColumnLayout> = g
                    .layout
                    .columns
                    .iter()
                    .filter(|c| {
                        c.frozen
                            || (c.right() as i32 >= scroll.x
                                && (c.left as i32) < scroll.x + body.width as i32)
                    })
                    .copied()
                    .collect();
                let rows = self
                    .store
                    .with_records(|records| {
                        let range = visible_range(scroll.y, body.height, g.config.row_height, records.len());
                        records[range.clone()]
                            .iter()
                            .zip(range)
                            .map(|(record, index)| render_row(&g, &columns, record, index, scroll.y))
                            .collect()
                    })
                    .unwrap_or_default();
                (
                    headers,
                    rows,
                    g.layout.frozen_width,
                    g.config.header_height,
                    g.config.row_height,
                )
            })
            .unwrap_or_default();

        GridFrame {
            grid: self.id,
            headers,
            rows,
            frozen_width,
            header_height,
            row_height,
            scroll,
            vertical: self.scroll.track(Axis::Y),
            horizontal: self.scroll.track(Axis::X),
            layout,
        }
    }
}

fn render_headers(
    inner: &GridInner,
    sort: impl Fn(&str) -> Option<Direction>,
) -> Vec<HeaderFrame> {
    inner
        .layout
        .headers
        .iter()
        .filter_map(|header| {
            let column = inner.columns.get(header.key)?;
            Some(HeaderFrame {
                key: header.key,
                text: column.text().to_string(),
                depth: header.depth,
                left: header.left,
                width: header.width,
                frozen: header.frozen,
                end: header.end,
                sort: column.sort_field().and_then(&sort),
                resizable: inner.columns.is_resizable(header.key),
            })
        })
        .collect()
}

fn render_row(
    inner: &GridInner,
    columns: &[ColumnLayout],
    record: &Record,
    index: usize,
    scroll_y: i32,
) -> RowFrame {
    let selected = inner.selection.is_selected(record.hash());
    let focused_cell = inner.focused.filter(|cell| cell.row == index);
    let cells = columns
        .iter()
        .filter_map(|placement| {
            let column = inner.columns.get(placement.key)?;
            let text = if column.is_check() {
                (if selected { "[x]" } else { "[ ]" }).to_string()
            } else {
                let data_index = column.data_index().unwrap_or_default();
                let value = record.value(data_index);
                match &column.renderer {
                    Some(renderer) => renderer.render(&Cell {
                        value,
                        record,
                        row: index,
                        column: placement.index,
                        data_index,
                    }),
                    None => value.to_string(),
                }
            };
            Some(CellFrame {
                column: placement.index,
                left: placement.left,
                width: placement.width,
                text,
                align: column.align(),
                frozen: placement.frozen,
                focused: focused_cell == Some(CellPos {
                    row: index,
                    column: placement.index,
                }),
            })
        })
        .collect();

    RowFrame {
        index,
        top: (index as u32 * inner.config.row_height) as i32 - scroll_y,
        selected,
        focused: focused_cell.is_some(),
        cells,
    }
}
