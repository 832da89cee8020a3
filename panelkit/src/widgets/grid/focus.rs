//! Cell focus and keyboard handling.

use std::time::Instant;

use super::CellPos;
use super::Grid;
use super::GridEvent;
use crate::input::Key;
use crate::input::KeyCombo;
use crate::input::Modifiers;
use crate::widgets::events::EventResult;
use crate::widgets::events::WidgetEvents;
use crate::widgets::scroll::Point;
use crate::widgets::scroll::WheelMode;
use crate::widgets::traits::Focusable;
use crate::widgets::traits::Scrollable;
use crate::widgets::traits::Selectable;

impl Grid {
    /// The focused cell.
    pub fn focused_cell(&self) -> Option<CellPos> {
        self.inner.read().ok().and_then(|g| g.focused)
    }

    /// Focuses a cell and scrolls it into view.
    ///
    /// Rejects rows past the end and hidden or unknown columns. Returns
    /// whether the focus moved.
    pub fn focus_cell(&self, cell: CellPos) -> bool {
        let count = self.store.count();
        let previous = {
            let Ok(mut guard) = self.inner.write() else {
                return false;
            };
            let visible = guard
                .columns
                .leaf(cell.column)
                .is_some_and(|key| !guard.columns.is_hidden(key));
            if cell.row >= count || !visible {
                return false;
            }
            if guard.focused == Some(cell) {
                return false;
            }
            guard.focused.replace(cell)
        };
        self.scroll_into_view(cell);
        self.mark_dirty();
        self.emit(GridEvent::FocusChange {
            grid: self.id,
            previous,
            current: Some(cell),
        });
        true
    }

    /// Removes focus.
    pub fn clear_focus(&self) -> bool {
        let previous = self.inner.write().ok().and_then(|mut g| g.focused.take());
        if previous.is_none() {
            return false;
        }
        self.mark_dirty();
        self.emit(GridEvent::FocusChange {
            grid: self.id,
            previous,
            current: None,
        });
        true
    }

    /// Moves focus `step` visible columns left (negative) or right,
    /// skipping hidden columns and stopping at the ends.
    pub fn move_focus_horizontal(&self, step: isize) -> bool {
        let Some(target) = self.inner.read().ok().and_then(|g| {
            let current = g.focused?;
            let visible: Vec<usize> = (0..g.columns.leaves().len())
                .filter(|index| {
                    g.columns
                        .leaf(*index)
                        .is_some_and(|key| !g.columns.is_hidden(key))
                })
                .collect();
            let position = visible.iter().position(|index| *index == current.column)?;
            let next = position.saturating_add_signed(step).min(visible.len().saturating_sub(1));
            Some(CellPos {
                row: current.row,
                column: visible[next],
            })
        }) else {
            return false;
        };
        self.focus_cell(target)
    }

    /// Scrolls so a cell is fully visible.
    ///
    /// Vertically the row is kept between the header and the bottom of the
    /// body. Horizontally the cell is kept between the pinned region and the
    /// right edge; pinned cells never scroll horizontally.
    pub fn scroll_into_view(&self, cell: CellPos) {
        let Some((row_height, placement)) = self.inner.read().ok().map(|g| {
            let placement = g
                .columns
                .leaf(cell.column)
                .and_then(|key| g.layout.column(key).copied());
            (g.config.row_height as i32, placement)
        }) else {
            return;
        };

        let viewport = self.scroll.viewport();
        let mut target = self.scroll.position();

        let top = cell.row as i32 * row_height;
        let bottom = top + row_height;
        let body = viewport.height as i32;
        if top < target.y {
            target.y = top;
        } else if bottom > target.y + body {
            target.y = bottom - body;
        }

        if let Some(column) = placement
            && !column.frozen
        {
            let left = column.left as i32;
            let right = column.right() as i32;
            let region = viewport.width as i32;
            if left < target.x {
                target.x = left;
            } else if right > target.x + region {
                target.x = right - region;
            }
        }

        self.scroll.scroll_to(target);
    }

    /// Keeps focus on a row that exists.
    pub(super) fn clamp_focus(&self) {
        let count = self.store.count();
        let Some(previous) = self.focused_cell() else {
            return;
        };
        if previous.row < count {
            return;
        }
        if count == 0 {
            self.clear_focus();
        } else {
            self.focus_cell(CellPos {
                row: count - 1,
                column: previous.column,
            });
        }
    }

    /// Moves focus off a column that became hidden.
    pub(super) fn repair_focus_column(&self) {
        let Some(cell) = self.focused_cell() else {
            return;
        };
        let replacement = self.inner.read().ok().and_then(|g| {
            let hidden = g
                .columns
                .leaf(cell.column)
                .is_none_or(|key| g.columns.is_hidden(key));
            if !hidden {
                return None;
            }
            let visible = |index: &usize| {
                g.columns
                    .leaf(*index)
                    .is_some_and(|key| !g.columns.is_hidden(key))
            };
            let leaves = g.columns.leaves().len();
            (cell.column..leaves)
                .find(visible)
                .or_else(|| (0..cell.column).rev().find(visible))
                .map(Some)
        });
        match replacement {
            Some(Some(column)) => {
                self.focus_cell(CellPos {
                    row: cell.row,
                    column,
                });
            }
            Some(None) => {
                self.clear_focus();
            }
            None => {}
        }
    }

    /// Cell under a grid-relative point, `None` over the header.
    pub fn cell_at(&self, position: Point) -> Option<CellPos> {
        let scroll = self.scroll.position();
        let (header_height, column) = self.inner.read().ok().map(|g| {
            let frozen_width = g.layout.frozen_width as i32;
            let hit = |x: i32, frozen: bool| {
                g.layout
                    .columns
                    .iter()
                    .filter(|c| c.frozen == frozen)
                    .find(|c| x >= c.left as i32 && x <= c.right() as i32)
                    .map(|c| c.index)
            };
            let column = if position.x < frozen_width {
                hit(position.x, true)
            } else {
                hit(position.x - frozen_width + scroll.x, false)
            };
            (g.config.header_height as i32, column)
        })?;
        if position.y < header_height {
            return None;
        }
        let row = self.index_at(position.y - header_height)?;
        Some(CellPos { row, column: column? })
    }

    /// Position in the scroll body's coordinates.
    fn body_point(&self, position: Point) -> Point {
        let (frozen_width, header_height) = self
            .inner
            .read()
            .map(|g| (g.layout.frozen_width as i32, g.config.header_height as i32))
            .unwrap_or((0, 0));
        Point::new(position.x - frozen_width, position.y - header_height)
    }

    /// Header leaf under a grid-relative point.
    fn header_at(&self, position: Point) -> Option<super::ColumnKey> {
        let scroll_x = self.scroll.position().x;
        let guard = self.inner.read().ok()?;
        if position.y < 0 || position.y >= guard.config.header_height as i32 {
            return None;
        }
        let frozen_width = guard.layout.frozen_width as i32;
        let (x, frozen) = if position.x < frozen_width {
            (position.x, true)
        } else {
            (position.x - frozen_width + scroll_x, false)
        };
        guard
            .layout
            .columns
            .iter()
            .filter(|c| c.frozen == frozen)
            .find(|c| x >= c.left as i32 && x <= c.right() as i32)
            .map(|c| c.key)
    }
}

impl Focusable for Grid {
    fn cursor(&self) -> Option<usize> {
        self.focused_cell().map(|cell| cell.row)
    }

    fn set_cursor(&self, row: usize) -> Option<usize> {
        let previous = self.focused_cell();
        let column = previous
            .map(|cell| cell.column)
            .or_else(|| self.inner.read().ok().and_then(|g| g.default_column()));
        if let Some(column) = column {
            self.focus_cell(CellPos { row, column });
        }
        previous.map(|cell| cell.row)
    }

    fn item_count(&self) -> usize {
        self.store.count()
    }

    fn item_height(&self) -> u32 {
        self.inner.read().map(|g| g.config.row_height).unwrap_or(0)
    }

    fn scroll_to_cursor(&self) {
        if let Some(cell) = self.focused_cell() {
            self.scroll_into_view(cell);
        }
    }
}

impl WidgetEvents for Grid {
    fn on_click(&self, position: Point, modifiers: Modifiers) -> EventResult {
        if let Some(key) = self.resize_handle_at(position) {
            return if self.begin_resize(key, position.x) {
                EventResult::StartDrag
            } else {
                EventResult::Ignored
            };
        }
        if let Some(key) = self.header_at(position) {
            self.spawn_sort(key);
            return EventResult::Consumed;
        }
        let result = self.handle_track_press(self.body_point(position));
        if result.is_handled() {
            return result;
        }
        match self.cell_at(position) {
            Some(cell) => {
                self.click_cell(cell, modifiers.ctrl);
                EventResult::Consumed
            }
            None => EventResult::Ignored,
        }
    }

    /// A press on a cell also grabs the body for drag scrolling.
    fn on_press(&self, position: Point, modifiers: Modifiers, at: Instant) -> EventResult {
        let result = self.on_click(position, modifiers);
        let on_body = self.cell_at(position).is_some() && !self.is_on_track(self.body_point(position));
        if result == EventResult::Consumed && on_body {
            return self.handle_body_grab(position, at);
        }
        result
    }

    fn on_touch_start(&self, position: Point, at: Instant) -> EventResult {
        if self.cell_at(position).is_none() {
            return EventResult::Ignored;
        }
        self.handle_touch_start(position, at)
    }

    fn on_double_click(&self, position: Point) -> EventResult {
        let opened = self.cell_at(position).is_some_and(|cell| self.open_item(cell.row));
        EventResult::from_handled(opened)
    }

    fn on_context_menu(&self, position: Point) -> EventResult {
        let opened = self.cell_at(position).is_some_and(|cell| self.open_menu(cell.row));
        EventResult::from_handled(opened)
    }

    fn on_drag(&self, position: Point, at: Instant) -> EventResult {
        if self.is_resizing() {
            self.drag_resize(position.x);
            return EventResult::Consumed;
        }
        if self.scroll.track_drag().is_some() {
            return self.handle_track_drag(self.body_point(position));
        }
        self.handle_touch_move(position, at)
    }

    fn on_release(&self, _position: Point, at: Instant) -> EventResult {
        if self.end_resize() {
            return EventResult::Consumed;
        }
        if self.scroll.track_drag().is_some() {
            return self.handle_track_release();
        }
        self.handle_touch_end(at)
    }

    fn on_wheel(&self, delta_x: f64, delta_y: f64, mode: WheelMode) -> EventResult {
        self.handle_wheel(delta_x, delta_y, mode)
    }

    /// Arrows move the focused cell, Space/Enter toggle the focused row,
    /// Escape cancels a resize or clears focus.
    fn on_key(&self, key: KeyCombo) -> EventResult {
        match key.key {
            Key::Left => return EventResult::from_handled(self.move_focus_horizontal(-1)),
            Key::Right => return EventResult::from_handled(self.move_focus_horizontal(1)),
            Key::Escape => {
                let handled = self.cancel_resize() || self.clear_focus();
                return EventResult::from_handled(handled);
            }
            _ => {}
        }
        if let Some(result) = self.handle_navigation_key(&key) {
            return result;
        }
        if let Some(result) = self.handle_selection_key(&key, self.cursor()) {
            return result;
        }
        EventResult::Ignored
    }
}
