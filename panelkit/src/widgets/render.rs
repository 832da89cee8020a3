//! Render pipeline shared by the engines.
//!
//! Engines only rebuild a frame when their own state or their scroll
//! controller changed since the last frame.

use std::ops::Range;

use super::traits::Scrollable;

/// Widgets that produce a frame for the host to paint.
pub trait Renderable: Scrollable {
    /// What the host paints.
    type Frame;

    /// Builds a frame from the current state.
    fn render(&self) -> Self::Frame;
}

/// Renders when the widget or its scroll position changed, clearing both
/// dirty flags.
pub fn render_if_dirty<W: Renderable>(widget: &W) -> Option<W::Frame> {
    if !widget.is_dirty() && !widget.scroll().is_dirty() {
        return None;
    }
    let frame = widget.render();
    widget.clear_dirty();
    widget.scroll().clear_dirty();
    Some(frame)
}

/// Rows intersecting `[offset, offset + viewport)`.
pub fn visible_range(offset: i32, viewport: u32, item_height: u32, count: usize) -> Range<usize> {
    if item_height == 0 || count == 0 {
        return 0..0;
    }
    let offset = offset.max(0) as u64;
    let height = item_height as u64;
    let start = (offset / height) as usize;
    let end = (offset + viewport as u64).div_ceil(height) as usize;
    start.min(count)..end.min(count)
}
