//! Widget event handling types and traits.
//!
//! Engines never read host events directly. The host hit-tests, converts
//! coordinates into the widget's surface and calls these handlers; the
//! returned [`EventResult`] tells it whether to keep propagating.

use std::time::Instant;

use crate::input::KeyCombo;
use crate::input::Modifiers;
use crate::input::PointerButton;
use crate::input::PointerEvent;
use crate::input::PointerKind;
use crate::widgets::scroll::Point;
use crate::widgets::scroll::WheelMode;

// =============================================================================
// Event Result
// =============================================================================

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, try other handlers.
    Ignored,
    /// Event was consumed, stop propagation.
    Consumed,
    /// Event started a drag operation on this widget.
    StartDrag,
}

impl EventResult {
    /// Check if the event was handled (consumed or started drag).
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventResult::Ignored)
    }

    /// `Consumed` when `handled`, `Ignored` otherwise.
    pub fn from_handled(handled: bool) -> Self {
        if handled { EventResult::Consumed } else { EventResult::Ignored }
    }
}

// =============================================================================
// Widget Events
// =============================================================================

/// Trait for widgets that can handle input.
///
/// All methods default to `EventResult::Ignored`, so widgets only
/// implement the events they care about. Coordinates are relative to the
/// widget's top-left corner.
pub trait WidgetEvents {
    /// Primary button press.
    fn on_click(&self, _position: Point, _modifiers: Modifiers) -> EventResult {
        EventResult::Ignored
    }

    /// Primary button press with its timestamp.
    ///
    /// Widgets with a scrollable body grab it here and answer `StartDrag`.
    fn on_press(&self, position: Point, modifiers: Modifiers, _at: Instant) -> EventResult {
        self.on_click(position, modifiers)
    }

    /// Finger down.
    fn on_touch_start(&self, _position: Point, _at: Instant) -> EventResult {
        EventResult::Ignored
    }

    /// Primary button double press.
    fn on_double_click(&self, _position: Point) -> EventResult {
        EventResult::Ignored
    }

    /// Secondary button press.
    fn on_context_menu(&self, _position: Point) -> EventResult {
        EventResult::Ignored
    }

    /// Pointer moved with the primary button held after `StartDrag`.
    fn on_drag(&self, _position: Point, _at: Instant) -> EventResult {
        EventResult::Ignored
    }

    /// Pointer released after `StartDrag`.
    fn on_release(&self, _position: Point, _at: Instant) -> EventResult {
        EventResult::Ignored
    }

    /// Wheel input.
    fn on_wheel(&self, _delta_x: f64, _delta_y: f64, _mode: WheelMode) -> EventResult {
        EventResult::Ignored
    }

    /// Key press while the widget has focus.
    fn on_key(&self, _key: KeyCombo) -> EventResult {
        EventResult::Ignored
    }

    /// Routes a pointer event to the matching handler.
    ///
    /// Terminal wheels report lines.
    fn dispatch_pointer(&self, event: PointerEvent) -> EventResult {
        match event.kind {
            PointerKind::Press(PointerButton::Primary) => {
                self.on_press(event.position, event.modifiers, event.at)
            }
            PointerKind::TouchStart => self.on_touch_start(event.position, event.at),
            PointerKind::Press(PointerButton::Secondary) => self.on_context_menu(event.position),
            PointerKind::Drag => self.on_drag(event.position, event.at),
            PointerKind::Release => self.on_release(event.position, event.at),
            PointerKind::Wheel { delta_x, delta_y } => self.on_wheel(delta_x, delta_y, WheelMode::Line),
        }
    }
}
