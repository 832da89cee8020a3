//! Momentum scrolling for virtualized surfaces.
//!
//! A [`ScrollController`] owns the scroll position of one surface plus the
//! per-axis momentum and autoscroll velocities that move it. Wheel input
//! feeds momentum, drag/touch gestures move the position directly and
//! leave a release impulse behind, and [`ScrollController::tick`] advances
//! the physics once per frame.

mod config;
mod gesture;
mod ticker;
mod types;

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Instant;

pub use config::*;
pub use gesture::*;
pub use types::*;

pub(crate) use ticker::spawn_frame_loop;

/// Unique identifier for a scroll controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrollId(usize);

impl ScrollId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for ScrollId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__scroll_{}", self.0)
    }
}

/// Active scrollbar handle drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackDrag {
    /// Axis of the dragged track.
    pub axis: Axis,
    /// Pointer coordinate along the axis when the drag started.
    pub start_pointer: i32,
    /// Scroll position along the axis when the drag started.
    pub start_position: i32,
}

#[derive(Debug)]
pub(crate) struct ScrollInner {
    config: ScrollConfig,
    viewport: Size,
    content: Size,
    position: Point,
    momentum: Point,
    auto_scroll: Point,
    gesture: Option<Gesture>,
    track_drag: Option<TrackDrag>,
}

impl ScrollInner {
    fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            viewport: Size::default(),
            content: Size::default(),
            position: Point::ZERO,
            momentum: Point::ZERO,
            auto_scroll: Point::ZERO,
            gesture: None,
            track_drag: None,
        }
    }

    fn scroll_offset(&self) -> Point {
        let max = |axis| self.content.get(axis).saturating_sub(self.viewport.get(axis)) as i32;
        Point::new(max(Axis::X), max(Axis::Y))
    }

    fn clamp(&self, axis: Axis, value: i32) -> i32 {
        value.clamp(0, self.scroll_offset().get(axis))
    }

    fn clamp_position(&mut self) {
        for axis in Axis::BOTH {
            let clamped = self.clamp(axis, self.position.get(axis));
            self.position.set(axis, clamped);
        }
    }

    fn is_movable(&self, axis: Axis, delta: i32) -> bool {
        let current = self.position.get(axis);
        delta != 0 && self.clamp(axis, current.saturating_add(delta)) != current
    }

    /// Moves the position; returns whether it changed.
    fn move_by(&mut self, axis: Axis, delta: i32) -> bool {
        let current = self.position.get(axis);
        let next = self.clamp(axis, current.saturating_add(delta));
        self.position.set(axis, next);
        next != current
    }

    /// Advances one axis by one frame.
    fn step(&mut self, axis: Axis) -> bool {
        let remain = self.momentum.get(axis).saturating_add(self.auto_scroll.get(axis));
        if remain.abs() <= 1 {
            self.momentum.set(axis, 0);
            return false;
        }

        let next = (remain as f64 * self.config.effective_decay()).trunc() as i32;
        let delta = remain - next;
        if !self.is_movable(axis, delta) {
            self.momentum.set(axis, 0);
            return false;
        }
        self.momentum.set(axis, next);
        self.move_by(axis, delta)
    }

    fn tick(&mut self) -> bool {
        let moved_x = self.step(Axis::X);
        let moved_y = self.step(Axis::Y);
        moved_x || moved_y
    }

    fn track(&self, axis: Axis) -> Option<TrackGeometry> {
        let viewport = self.viewport.get(axis) as i32;
        let content = self.content.get(axis) as i32;
        if content <= viewport || viewport <= 0 {
            return None;
        }

        let length = viewport;
        let min_handle = (self.config.min_handle_length as i32).min(length);
        let handle_size =
            ((length as f64 * viewport as f64 / content as f64).round() as i32).clamp(min_handle, length);
        let offset = self.scroll_offset().get(axis);
        let ratio = if offset == 0 { 0.0 } else { self.position.get(axis) as f64 / offset as f64 };
        let handle_pos = ((length - handle_size) as f64 * ratio).round() as i32;

        let thickness = self.config.track_thickness as i32;
        let geometry = match axis {
            Axis::Y => TrackGeometry {
                axis: Some(Axis::Y),
                x: self.viewport.width as i32 - thickness,
                y: 0,
                width: thickness,
                height: length,
                handle_pos,
                handle_size,
            },
            Axis::X => TrackGeometry {
                axis: Some(Axis::X),
                x: 0,
                y: self.viewport.height as i32 - thickness,
                width: length,
                height: thickness,
                handle_pos,
                handle_size,
            },
        };
        Some(geometry)
    }
}

/// Scroll position, momentum and gesture state of one surface.
///
/// Cheap to clone; clones share state.
///
/// # Example
///
/// ```
/// use panelkit::widgets::scroll::{Point, ScrollConfig, ScrollController, Size};
///
/// let scroll = ScrollController::new(ScrollConfig::default().with_decay(0.8));
/// scroll.set_viewport(Size::new(300, 200));
/// scroll.set_content(Size::new(300, 1000));
/// scroll.set_momentum(Point::new(0, 40));
///
/// scroll.tick();
/// assert_eq!(scroll.position(), Point::new(0, 8));
/// assert_eq!(scroll.momentum(), Point::new(0, 32));
/// ```
#[derive(Debug, Clone)]
pub struct ScrollController {
    id: ScrollId,
    pub(crate) inner: Arc<RwLock<ScrollInner>>,
    dirty: Arc<AtomicBool>,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl ScrollController {
    /// Creates a controller at rest at the origin.
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            id: ScrollId::new(),
            inner: Arc::new(RwLock::new(ScrollInner::new(config))),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the unique ID.
    pub fn id(&self) -> ScrollId {
        self.id
    }

    fn mark_dirty(&self, changed: bool) -> bool {
        if changed {
            self.dirty.store(true, Ordering::SeqCst);
        }
        changed
    }

    /// Whether the position changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag after rendering.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Dimensions
    // -------------------------------------------------------------------------

    /// Sets the visible size and re-clamps the position.
    pub fn set_viewport(&self, viewport: Size) {
        let changed = self
            .inner
            .write()
            .map(|mut g| {
                if g.viewport == viewport {
                    return false;
                }
                g.viewport = viewport;
                g.clamp_position();
                true
            })
            .unwrap_or(false);
        self.mark_dirty(changed);
    }

    /// Sets the content size and re-clamps the position.
    pub fn set_content(&self, content: Size) {
        let changed = self
            .inner
            .write()
            .map(|mut g| {
                if g.content == content {
                    return false;
                }
                g.content = content;
                g.clamp_position();
                true
            })
            .unwrap_or(false);
        self.mark_dirty(changed);
    }

    /// Visible size.
    pub fn viewport(&self) -> Size {
        self.inner.read().map(|g| g.viewport).unwrap_or_default()
    }

    /// Content size.
    pub fn content(&self) -> Size {
        self.inner.read().map(|g| g.content).unwrap_or_default()
    }

    /// Largest position per axis (`content - viewport`, at least 0).
    pub fn scroll_offset(&self) -> Point {
        self.inner.read().map(|g| g.scroll_offset()).unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Position
    // -------------------------------------------------------------------------

    /// Current position.
    pub fn position(&self) -> Point {
        self.inner.read().map(|g| g.position).unwrap_or_default()
    }

    /// Jumps to a position, clamped into range.
    pub fn scroll_to(&self, position: Point) -> bool {
        let changed = self
            .inner
            .write()
            .map(|mut g| {
                let before = g.position;
                g.position = position;
                g.clamp_position();
                g.position != before
            })
            .unwrap_or(false);
        self.mark_dirty(changed)
    }

    /// Jumps along one axis, clamped into range.
    pub fn scroll_axis_to(&self, axis: Axis, value: i32) -> bool {
        let mut position = self.position();
        position.set(axis, value);
        self.scroll_to(position)
    }

    /// Moves by a delta, clamped into range.
    pub fn scroll_by(&self, delta: Point) -> bool {
        let changed = self
            .inner
            .write()
            .map(|mut g| {
                let x = g.move_by(Axis::X, delta.x);
                let y = g.move_by(Axis::Y, delta.y);
                x || y
            })
            .unwrap_or(false);
        self.mark_dirty(changed)
    }

    /// Whether moving by `delta` along `axis` would change the position.
    pub fn is_movable(&self, axis: Axis, delta: i32) -> bool {
        self.inner.read().map(|g| g.is_movable(axis, delta)).unwrap_or(false)
    }

    /// Scroll progress along an axis (0.0 - 1.0).
    pub fn ratio(&self, axis: Axis) -> f64 {
        self.inner
            .read()
            .map(|g| {
                let offset = g.scroll_offset().get(axis);
                if offset == 0 { 0.0 } else { g.position.get(axis) as f64 / offset as f64 }
            })
            .unwrap_or(0.0)
    }

    /// Scrolls to a progress ratio along an axis.
    pub fn scroll_to_ratio(&self, axis: Axis, ratio: f64) -> bool {
        let offset = self.scroll_offset().get(axis);
        self.scroll_axis_to(axis, (offset as f64 * ratio.clamp(0.0, 1.0)).round() as i32)
    }

    // -------------------------------------------------------------------------
    // Momentum
    // -------------------------------------------------------------------------

    /// Current momentum.
    pub fn momentum(&self) -> Point {
        self.inner.read().map(|g| g.momentum).unwrap_or_default()
    }

    /// Replaces the momentum.
    pub fn set_momentum(&self, momentum: Point) {
        if let Ok(mut guard) = self.inner.write() {
            guard.momentum = momentum;
        }
    }

    /// Stops any momentum.
    pub fn cancel_momentum(&self) {
        self.set_momentum(Point::ZERO);
    }

    /// Current autoscroll velocity.
    pub fn auto_scroll(&self) -> Point {
        self.inner.read().map(|g| g.auto_scroll).unwrap_or_default()
    }

    /// Sets a continuous velocity added to momentum every frame.
    pub fn set_auto_scroll(&self, velocity: Point) {
        if let Ok(mut guard) = self.inner.write() {
            if guard.auto_scroll != velocity {
                log::trace!("{}: autoscroll {:?}", self.id, velocity);
            }
            guard.auto_scroll = velocity;
        }
    }

    /// Stops autoscroll.
    pub fn cancel_auto_scroll(&self) {
        self.set_auto_scroll(Point::ZERO);
    }

    /// Whether momentum or autoscroll would move the surface.
    pub fn is_animating(&self) -> bool {
        self.inner
            .read()
            .map(|g| !g.momentum.is_zero() || !g.auto_scroll.is_zero())
            .unwrap_or(false)
    }

    /// Advances the physics by one frame. Returns whether the position
    /// changed.
    ///
    /// Per axis, `remain = momentum + autoscroll`. A remain of at most one
    /// pixel brings the axis to rest. Otherwise the decayed remainder is
    /// carried into the next frame and the rest is applied to the position.
    pub fn tick(&self) -> bool {
        let changed = self.inner.write().map(|mut g| g.tick()).unwrap_or(false);
        self.mark_dirty(changed)
    }

    // -------------------------------------------------------------------------
    // Wheel and gestures
    // -------------------------------------------------------------------------

    /// Adds a wheel delta to momentum.
    ///
    /// Returns `false` when the surface cannot move in that direction, so
    /// the caller can let an outer surface handle the wheel.
    pub fn wheel(&self, delta_x: f64, delta_y: f64, mode: WheelMode) -> bool {
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };
        let multiplier = |axis: Axis| match mode {
            WheelMode::Pixel => 1.0,
            WheelMode::Line => guard.config.line_height,
            WheelMode::Page => guard.viewport.get(axis) as f64,
        };
        let impulse = Point::new(
            (delta_x * multiplier(Axis::X)).round() as i32,
            (delta_y * multiplier(Axis::Y)).round() as i32,
        );

        let mut consumed = false;
        for axis in Axis::BOTH {
            let delta = impulse.get(axis);
            if guard.is_movable(axis, delta) {
                let momentum = guard.momentum.get(axis);
                guard.momentum.set(axis, momentum.saturating_add(delta));
                consumed = true;
            }
        }
        consumed
    }

    /// Starts a drag/touch gesture; cancels momentum.
    pub fn begin_gesture(&self, kind: GestureKind, pointer: Point, at: Instant) {
        if let Ok(mut guard) = self.inner.write() {
            guard.momentum = Point::ZERO;
            guard.gesture = Some(Gesture::new(kind, pointer, at));
        }
    }

    /// Moves the surface under the pointer. Returns whether the position
    /// changed.
    pub fn move_gesture(&self, pointer: Point, at: Instant) -> bool {
        let changed = self
            .inner
            .write()
            .map(|mut g| {
                let window = g.config.sample_window;
                let Some(gesture) = g.gesture.as_mut() else {
                    return false;
                };
                let delta = gesture.sample(pointer, at, window);
                let x = g.move_by(Axis::X, delta.x.saturating_neg());
                let y = g.move_by(Axis::Y, delta.y.saturating_neg());
                x || y
            })
            .unwrap_or(false);
        self.mark_dirty(changed)
    }

    /// Ends the gesture and converts the release velocity into momentum.
    ///
    /// Returns the injected momentum.
    pub fn end_gesture(&self, at: Instant) -> Point {
        let Ok(mut guard) = self.inner.write() else {
            return Point::ZERO;
        };
        let Some(gesture) = guard.gesture.take() else {
            return Point::ZERO;
        };

        let (vx, vy) = gesture.velocity(at, guard.config.sample_window);
        let scale = guard.config.fling_multiplier * guard.config.device_pixel_ratio;
        // content moves against the pointer
        let mut impulse = Point::new(
            (-vx * scale).round() as i32,
            (-vy * scale).round() as i32,
        );
        for axis in Axis::BOTH {
            if !guard.is_movable(axis, impulse.get(axis)) {
                impulse.set(axis, 0);
            }
        }
        guard.momentum = impulse;
        log::trace!("{}: release impulse {:?}", self.id, impulse);
        impulse
    }

    /// Whether a gesture is active.
    pub fn is_gesturing(&self) -> bool {
        self.inner.read().map(|g| g.gesture.is_some()).unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Tracks
    // -------------------------------------------------------------------------

    /// Geometry of the scrollbar on an axis, `None` when nothing overflows.
    pub fn track(&self, axis: Axis) -> Option<TrackGeometry> {
        self.inner.read().ok().and_then(|g| g.track(axis))
    }

    /// Starts dragging the handle on an axis.
    pub fn begin_track_drag(&self, axis: Axis, pointer: i32) {
        if let Ok(mut guard) = self.inner.write() {
            guard.momentum.set(axis, 0);
            guard.track_drag = Some(TrackDrag {
                axis,
                start_pointer: pointer,
                start_position: guard.position.get(axis),
            });
        }
    }

    /// Moves the handle with the pointer.
    ///
    /// Pointer travel maps proportionally: `offset * (delta / travel)`.
    pub fn drag_track(&self, pointer: i32) -> bool {
        let changed = self
            .inner
            .write()
            .map(|mut g| {
                let Some(drag) = g.track_drag else {
                    return false;
                };
                let Some(track) = g.track(drag.axis) else {
                    return false;
                };
                let travel = track.travel();
                if travel == 0 {
                    return false;
                }
                let offset = g.scroll_offset().get(drag.axis);
                let moved = offset as f64 * (pointer.saturating_sub(drag.start_pointer) as f64 / travel as f64);
                let target = drag.start_position.saturating_add(moved.round() as i32);
                let current = g.position.get(drag.axis);
                g.move_by(drag.axis, target.saturating_sub(current))
            })
            .unwrap_or(false);
        self.mark_dirty(changed)
    }

    /// Ends a handle drag.
    pub fn end_track_drag(&self) -> bool {
        self.inner
            .write()
            .map(|mut g| g.track_drag.take().is_some())
            .unwrap_or(false)
    }

    /// Active handle drag.
    pub fn track_drag(&self) -> Option<TrackDrag> {
        self.inner.read().ok().and_then(|g| g.track_drag)
    }

    /// Jumps so the handle centers on a click on the track.
    pub fn click_track(&self, axis: Axis, x: i32, y: i32) -> bool {
        let Some(track) = self.track(axis) else {
            return false;
        };
        if !track.contains(x, y) || track.handle_contains(x, y) {
            return false;
        }
        self.scroll_to_ratio(axis, track.position_to_ratio(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(decay: f64) -> ScrollController {
        let scroll = ScrollController::new(ScrollConfig::default().with_decay(decay));
        scroll.set_viewport(Size::new(200, 200));
        scroll.set_content(Size::new(1000, 1000));
        scroll
    }

    #[test]
    fn test_step_carries_decayed_remainder() {
        let scroll = controller(0.8);
        scroll.set_momentum(Point::new(40, 0));

        assert!(scroll.tick());
        assert_eq!((scroll.momentum().x, scroll.position().x), (32, 8));
        assert!(scroll.tick());
        assert_eq!((scroll.momentum().x, scroll.position().x), (25, 15));
    }

    #[test]
    fn test_negative_momentum_comes_to_rest() {
        let scroll = controller(0.95);
        scroll.scroll_to(Point::new(0, 800));
        scroll.set_momentum(Point::new(0, -30));

        let mut frames = 0;
        while scroll.is_animating() {
            scroll.tick();
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(scroll.position().y < 800);
    }

    #[test]
    fn test_boundary_absorbs_momentum() {
        let scroll = controller(0.9);
        scroll.set_momentum(Point::new(0, -50));

        assert!(!scroll.tick());
        assert_eq!(scroll.momentum(), Point::ZERO);
        assert_eq!(scroll.position(), Point::ZERO);
    }
}
