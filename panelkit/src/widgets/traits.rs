//! Shared traits for the row-based engines.
//!
//! These traits carry the behavior grid, list and tree have in common:
//! scrolling through a [`ScrollController`], moving a row cursor and
//! keeping a [`Selection`]. Implementors supply the required accessors
//! and get the provided handlers.
//!
//! ```text
//! Scrollable
//!     └── Focusable
//! Selectable
//! ```

use std::time::Instant;

use panelkit_data::model::Record;

use super::events::EventResult;
use super::scroll::Axis;
use super::scroll::GestureKind;
use super::scroll::Point;
use super::scroll::ScrollController;
use super::scroll::WheelMode;
use super::selection::Selection;
use super::selection::SelectionConfig;
use super::selection::SelectionDelta;
use crate::input::Key;
use crate::input::KeyCombo;

// =============================================================================
// Scrollable
// =============================================================================

/// Widgets whose body moves through a [`ScrollController`].
pub trait Scrollable {
    /// Get the unique ID as a string.
    fn id_string(&self) -> String;

    /// The body's scroll controller.
    fn scroll(&self) -> &ScrollController;

    /// Check if the widget state has changed and needs re-render.
    fn is_dirty(&self) -> bool;

    /// Clear the dirty flag after rendering.
    fn clear_dirty(&self);

    // =========================================================================
    // Provided Methods - Wheel and Touch
    // =========================================================================

    /// Feeds a wheel delta into momentum. Ignored when the body cannot
    /// move that way, so an outer surface can take it.
    fn handle_wheel(&self, delta_x: f64, delta_y: f64, mode: WheelMode) -> EventResult {
        EventResult::from_handled(self.scroll().wheel(delta_x, delta_y, mode))
    }

    /// Starts a touch gesture.
    fn handle_touch_start(&self, pointer: Point, at: Instant) -> EventResult {
        self.scroll().begin_gesture(GestureKind::Touch, pointer, at);
        EventResult::StartDrag
    }

    /// Grabs the body under a mouse press so following drags move it.
    fn handle_body_grab(&self, pointer: Point, at: Instant) -> EventResult {
        self.scroll().begin_gesture(GestureKind::Drag, pointer, at);
        EventResult::StartDrag
    }

    /// Moves the body under the finger.
    fn handle_touch_move(&self, pointer: Point, at: Instant) -> EventResult {
        if !self.scroll().is_gesturing() {
            return EventResult::Ignored;
        }
        self.scroll().move_gesture(pointer, at);
        EventResult::Consumed
    }

    /// Releases the finger, leaving a fling impulse behind.
    fn handle_touch_end(&self, at: Instant) -> EventResult {
        if !self.scroll().is_gesturing() {
            return EventResult::Ignored;
        }
        self.scroll().end_gesture(at);
        EventResult::Consumed
    }

    // =========================================================================
    // Provided Methods - Tracks
    // =========================================================================

    /// Handles a press in body coordinates on either scrollbar.
    ///
    /// A press on the handle starts a drag; a press elsewhere on the track
    /// jumps there.
    fn handle_track_press(&self, position: Point) -> EventResult {
        let scroll = self.scroll();
        for axis in Axis::BOTH {
            let Some(track) = scroll.track(axis) else {
                continue;
            };
            if track.handle_contains(position.x, position.y) {
                scroll.begin_track_drag(axis, position.get(axis));
                return EventResult::StartDrag;
            }
            if track.contains(position.x, position.y) {
                scroll.click_track(axis, position.x, position.y);
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }

    /// Whether a body point lies on either scrollbar.
    fn is_on_track(&self, position: Point) -> bool {
        Axis::BOTH.into_iter().any(|axis| {
            self.scroll()
                .track(axis)
                .is_some_and(|track| track.contains(position.x, position.y))
        })
    }

    /// Moves an active handle drag.
    fn handle_track_drag(&self, position: Point) -> EventResult {
        let Some(drag) = self.scroll().track_drag() else {
            return EventResult::Ignored;
        };
        self.scroll().drag_track(position.get(drag.axis));
        EventResult::Consumed
    }

    /// Ends an active handle drag.
    fn handle_track_release(&self) -> EventResult {
        EventResult::from_handled(self.scroll().end_track_drag())
    }
}

// =============================================================================
// Focusable
// =============================================================================

/// Widgets with a row cursor over fixed-height rows.
pub trait Focusable: Scrollable {
    /// Current cursor row.
    fn cursor(&self) -> Option<usize>;

    /// Moves the cursor. Returns the previous cursor.
    fn set_cursor(&self, row: usize) -> Option<usize>;

    /// Number of rows.
    fn item_count(&self) -> usize;

    /// Height of one row.
    fn item_height(&self) -> u32;

    // =========================================================================
    // Provided Methods
    // =========================================================================

    /// Number of whole rows that fit in the body.
    fn viewport_item_count(&self) -> usize {
        let height = self.item_height();
        if height == 0 {
            return 0;
        }
        (self.scroll().viewport().height / height) as usize
    }

    /// Row under a body-relative y coordinate.
    fn index_at(&self, y: i32) -> Option<usize> {
        let height = self.item_height() as i32;
        let absolute = y + self.scroll().position().y;
        if height == 0 || absolute < 0 {
            return None;
        }
        let index = (absolute / height) as usize;
        (index < self.item_count()).then_some(index)
    }

    /// Scrolls vertically so the cursor row is fully visible.
    fn scroll_to_cursor(&self) {
        let Some(row) = self.cursor() else {
            return;
        };
        let scroll = self.scroll();
        let height = self.item_height() as i32;
        let body = scroll.viewport().height as i32;
        let top = row as i32 * height;
        let bottom = top + height;
        let current = scroll.position().y;
        if top < current {
            scroll.scroll_axis_to(Axis::Y, top);
        } else if bottom > current + body {
            scroll.scroll_axis_to(Axis::Y, bottom - body);
        }
    }

    /// Moves the cursor, keeping it in view. Returns whether it moved.
    fn handle_cursor_move(&self, row: usize) -> bool {
        let previous = self.set_cursor(row);
        if previous == Some(row) {
            return false;
        }
        self.scroll_to_cursor();
        true
    }

    /// Handles Up, Down, Home, End, PageUp and PageDown.
    ///
    /// Returns `None` for any other key.
    fn handle_navigation_key(&self, key: &KeyCombo) -> Option<EventResult> {
        let count = self.item_count();
        if count == 0 {
            return match key.key {
                Key::Up | Key::Down | Key::Home | Key::End | Key::PageUp | Key::PageDown => {
                    Some(EventResult::Ignored)
                }
                _ => None,
            };
        }
        let last = count - 1;
        let page = self.viewport_item_count().max(1);
        let target = match (key.key, self.cursor()) {
            (Key::Up, Some(row)) => row.saturating_sub(1),
            (Key::Down, Some(row)) => (row + 1).min(last),
            (Key::Up | Key::Down, None) => 0,
            (Key::Home, _) => 0,
            (Key::End, _) => last,
            (Key::PageUp, row) => row.unwrap_or(0).saturating_sub(page),
            (Key::PageDown, row) => (row.unwrap_or(0) + page).min(last),
            _ => return None,
        };
        Some(EventResult::from_handled(self.handle_cursor_move(target)))
    }
}

// =============================================================================
// Selectable
// =============================================================================

/// Widgets keeping a [`Selection`] over their rows.
///
/// Programmatic methods report changes through
/// [`notify_selection`](Self::notify_selection) with `complete == false`;
/// user toggles pass `true` so a completion notification follows.
pub trait Selectable {
    /// Runs `f` against the selection.
    fn with_selection<T>(&self, f: impl FnOnce(&mut Selection) -> T) -> Option<T>;

    /// Records of the current rows, in row order.
    fn row_records(&self) -> Vec<Record>;

    /// Record of one row.
    fn row_record(&self, row: usize) -> Option<Record> {
        self.row_records().into_iter().nth(row)
    }

    /// Publishes a selection change. Returns whether anything changed.
    fn notify_selection(&self, delta: &SelectionDelta, complete: bool) -> bool;

    // =========================================================================
    // Provided Methods - Queries
    // =========================================================================

    /// The normalized selection config.
    fn selection_config(&self) -> SelectionConfig {
        self.with_selection(|s| s.config()).unwrap_or_default()
    }

    /// Whether a row is selected.
    fn is_row_selected(&self, row: usize) -> bool {
        self.row_record(row)
            .and_then(|record| self.with_selection(|s| s.is_selected(record.hash())))
            .unwrap_or(false)
    }

    /// Indices of the selected rows, ascending.
    fn selected_rows(&self) -> Vec<usize> {
        let records = self.row_records();
        self.with_selection(|s| {
            records
                .iter()
                .enumerate()
                .filter(|(_, record)| s.is_selected(record.hash()))
                .map(|(row, _)| row)
                .collect()
        })
        .unwrap_or_default()
    }

    /// Selected records.
    fn selected_records(&self) -> Vec<Record> {
        self.with_selection(|s| s.records().cloned().collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Provided Methods - Mutations
    // =========================================================================

    /// Makes a row the sole selection. A no-op when it already is.
    fn select(&self, row: usize) -> bool {
        let Some(record) = self.row_record(row) else {
            return false;
        };
        let delta = self.with_selection(|s| s.select(&record)).unwrap_or_default();
        self.notify_selection(&delta, false)
    }

    /// Adds a row; replaces the selection when not `multiple`.
    fn select_row(&self, row: usize) -> bool {
        let Some(record) = self.row_record(row) else {
            return false;
        };
        let delta = self.with_selection(|s| s.add(&record)).unwrap_or_default();
        self.notify_selection(&delta, false)
    }

    /// Removes a row. Programmatic removal ignores `deselectable`.
    fn deselect_row(&self, row: usize) -> bool {
        let Some(record) = self.row_record(row) else {
            return false;
        };
        let delta = self
            .with_selection(|s| s.remove(record.hash()))
            .unwrap_or_default();
        self.notify_selection(&delta, false)
    }

    /// User toggle of a row.
    fn toggle_row(&self, row: usize) -> bool {
        let Some(record) = self.row_record(row) else {
            return false;
        };
        let delta = self.with_selection(|s| s.toggle(&record)).unwrap_or_default();
        self.notify_selection(&delta, true)
    }

    /// User confirmation of a row: adds it and never removes it.
    fn confirm_row(&self, row: usize) -> bool {
        let Some(record) = self.row_record(row) else {
            return false;
        };
        let delta = self.with_selection(|s| s.add(&record)).unwrap_or_default();
        self.notify_selection(&delta, true)
    }

    /// Selects every current row. Only for `multiple` selections.
    fn select_all(&self) -> bool {
        if !self.selection_config().multiple {
            return false;
        }
        let records = self.row_records();
        let delta = self
            .with_selection(|s| {
                let mut delta = SelectionDelta::default();
                for record in &records {
                    delta.extend(s.add(record));
                }
                delta
            })
            .unwrap_or_default();
        self.notify_selection(&delta, false)
    }

    /// Deselects every current row.
    fn deselect_all(&self) -> bool {
        let records = self.row_records();
        let delta = self
            .with_selection(|s| {
                let mut delta = SelectionDelta::default();
                for record in &records {
                    delta.extend(s.remove(record.hash()));
                }
                delta
            })
            .unwrap_or_default();
        self.notify_selection(&delta, false)
    }

    /// Drops every selection, including records no longer in the rows.
    fn reset_selections(&self) -> bool {
        let delta = self.with_selection(Selection::clear).unwrap_or_default();
        self.notify_selection(&delta, false)
    }

    /// Re-resolves selections after the rows were replaced.
    ///
    /// Keepable selections follow their records by identity hash; others
    /// are reset.
    fn resolve_selections(&self) -> bool {
        let records = self.row_records();
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

    /// Handles Space (toggle the cursor row), Enter (confirm the cursor
    /// row) and Ctrl+A.
    ///
    /// Returns `None` for any other key.
    fn handle_selection_key(&self, key: &KeyCombo, cursor: Option<usize>) -> Option<EventResult> {
        match key.key {
            Key::Space => {
                let toggled = cursor.is_some_and(|row| self.toggle_row(row));
                Some(EventResult::from_handled(toggled))
            }
            Key::Enter => {
                let confirmed = cursor.is_some_and(|row| self.confirm_row(row));
                Some(EventResult::from_handled(confirmed))
            }
            Key::Char('a') if key.modifiers.ctrl => Some(EventResult::from_handled(self.select_all())),
            _ => None,
        }
    }
}
