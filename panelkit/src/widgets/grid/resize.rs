//! Column resizing with edge autoscroll.
//!
//! While a scrollable column is dragged wider or narrower, a pointer within
//! [`RESIZE_EDGE`] pixels of either edge of the scroll region autoscrolls
//! horizontally. The speed grows with the distance past the threshold and
//! is capped at [`MAX_AUTO_SCROLL_SPEED`] pixels per frame.

use tokio::task::JoinHandle;

use super::ColumnKey;
use super::Grid;
use super::LayoutUpdate;
use crate::widgets::scroll::Point;
use crate::widgets::scroll::spawn_frame_loop;

/// Distance from a region edge that starts autoscroll.
pub const RESIZE_EDGE: i32 = 15;

/// Autoscroll speed cap, pixels per frame.
pub const MAX_AUTO_SCROLL_SPEED: i32 = 15;

/// Narrowest width a drag can produce.
pub const MIN_RESIZE_WIDTH: u32 = 20;

/// Half-width of the grip around a header's right edge.
pub const RESIZE_GRIP: i32 = 3;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResizeSession {
    key: ColumnKey,
    frozen: bool,
    start_width: u32,
    /// Pointer in content coordinates at drag start.
    start_pointer: i32,
    /// Last pointer in grid coordinates.
    last_pointer: i32,
}

/// Signed autoscroll speed for a pointer, zero inside the safe zone.
///
/// `start` and `end` bound the scroll region in grid coordinates.
pub fn edge_speed(pointer: i32, start: i32, end: i32) -> i32 {
    if pointer < start + RESIZE_EDGE {
        -(start + RESIZE_EDGE - pointer).min(MAX_AUTO_SCROLL_SPEED)
    } else if pointer > end - RESIZE_EDGE {
        (pointer - (end - RESIZE_EDGE)).min(MAX_AUTO_SCROLL_SPEED)
    } else {
        0
    }
}

impl Grid {
    /// Whether a column can be resized.
    pub fn is_resizable(&self, key: ColumnKey) -> bool {
        self.inner
            .read()
            .map(|g| g.columns.is_resizable(key))
            .unwrap_or(false)
    }

    /// Sets a column to a fixed width and recomputes the layout.
    ///
    /// Returns `None` for columns that cannot be resized.
    pub fn resize_column(&self, key: ColumnKey, width: u32) -> Option<LayoutUpdate> {
        let applied = self
            .inner
            .write()
            .map(|mut g| g.columns.is_resizable(key) && g.columns.set_width(key, width.max(MIN_RESIZE_WIDTH)))
            .unwrap_or(false);
        applied.then(|| self.update_layout())
    }

    /// Resizable column whose header edge is under a grid-relative point.
    pub fn resize_handle_at(&self, position: Point) -> Option<ColumnKey> {
        let scroll_x = self.scroll.position().x;
        let guard = self.inner.read().ok()?;
        if position.y < 0 || position.y >= guard.config.header_height as i32 {
            return None;
        }
        let frozen_width = guard.layout.frozen_width as i32;
        guard
            .layout
            .columns
            .iter()
            .filter(|c| guard.columns.is_resizable(c.key))
            .find(|c| {
                let origin = if c.frozen { 0 } else { frozen_width - scroll_x };
                let edge = origin + c.right() as i32;
                (position.x - edge).abs() <= RESIZE_GRIP
                    && (c.frozen || position.x >= frozen_width)
            })
            .map(|c| c.key)
    }

    /// Starts dragging a column edge at a grid-relative x.
    pub fn begin_resize(&self, key: ColumnKey, pointer_x: i32) -> bool {
        let scroll_x = self.scroll.position().x;
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };
        if !guard.columns.is_resizable(key) {
            return false;
        }
        let Some(column) = guard.layout.column(key).copied() else {
            return false;
        };
        let start_pointer = if column.frozen {
            pointer_x
        } else {
            pointer_x - guard.layout.frozen_width as i32 + scroll_x
        };
        guard.resize = Some(ResizeSession {
            key,
            frozen: column.frozen,
            start_width: column.width,
            start_pointer,
            last_pointer: pointer_x,
        });
        log::debug!("{}: resize {key:?} from {}", self.id, column.width);
        true
    }

    /// Whether a resize drag is active.
    pub fn is_resizing(&self) -> bool {
        self.inner.read().map(|g| g.resize.is_some()).unwrap_or(false)
    }

    /// Follows the pointer during a resize drag.
    ///
    /// Sets or cancels edge autoscroll for scrollable columns. Returns
    /// whether a drag is active.
    pub fn drag_resize(&self, pointer_x: i32) -> bool {
        let scroll_x = self.scroll.position().x;
        let Some((session, frozen_width, viewport_width)) = self
            .inner
            .write()
            .ok()
            .and_then(|mut g| {
                let session = g.resize.as_mut()?;
                session.last_pointer = pointer_x;
                let session = *session;
                Some((session, g.layout.frozen_width as i32, g.viewport.width as i32))
            })
        else {
            return false;
        };

        let content_pointer = if session.frozen {
            pointer_x
        } else {
            pointer_x - frozen_width + scroll_x
        };
        let width = (session.start_width as i32 + content_pointer - session.start_pointer)
            .max(MIN_RESIZE_WIDTH as i32) as u32;
        let changed = self
            .inner
            .write()
            .map(|mut g| {
                let current = g.columns.get(session.key).and_then(|c| c.width());
                current != Some(width) && g.columns.set_width(session.key, width)
            })
            .unwrap_or(false);
        if changed {
            self.update_layout();
        }

        if session.frozen {
            return true;
        }
        let speed = edge_speed(pointer_x, frozen_width, viewport_width);
        if speed == 0 {
            self.scroll.cancel_auto_scroll();
        } else {
            self.scroll.set_auto_scroll(Point::new(speed, 0));
        }
        true
    }

    /// Advances scroll physics one frame and keeps an active resize under
    /// the pointer while autoscroll moves the content.
    pub fn tick(&self) -> bool {
        let moved = self.scroll.tick();
        if moved
            && let Some(pointer) = self
                .inner
                .read()
                .ok()
                .and_then(|g| g.resize.map(|s| s.last_pointer))
        {
            self.drag_resize(pointer);
        }
        moved
    }

    /// Spawns a task calling [`tick`](Self::tick) every frame interval.
    ///
    /// Use this rather than the scroll controller's own ticker so an active
    /// resize keeps following autoscroll. The task ends once the grid is
    /// dropped. Must be called within a tokio runtime.
    pub fn spawn_ticker(&self) -> JoinHandle<()> {
        let grid = self.downgrade();
        let id = self.id;
        spawn_frame_loop(self.scroll.frame_interval(), move || {
            let Some(grid) = grid.upgrade() else {
                log::debug!("{id}: grid dropped, ticker stopped");
                return false;
            };
            grid.tick();
            true
        })
    }

    /// Finishes a resize drag and stops autoscroll.
    pub fn end_resize(&self) -> bool {
        let ended = self
            .inner
            .write()
            .map(|mut g| g.resize.take().is_some())
            .unwrap_or(false);
        self.scroll.cancel_auto_scroll();
        ended
    }

    /// Abandons a resize drag, restoring the starting width.
    pub fn cancel_resize(&self) -> bool {
        let Some(session) = self.inner.write().ok().and_then(|mut g| g.resize.take()) else {
            return false;
        };
        self.scroll.cancel_auto_scroll();
        if let Ok(mut guard) = self.inner.write() {
            guard.columns.set_width(session.key, session.start_width);
        }
        self.update_layout();
        true
    }
}
