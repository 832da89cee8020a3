//! Pointer events.

use std::time::Instant;

use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use super::keys::Modifiers;
use crate::widgets::scroll::Point;

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Primary action (left click, tap)
    Primary,
    /// Secondary action (right click, long press)
    Secondary,
}

/// What the pointer did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerKind {
    /// Button pressed.
    Press(PointerButton),
    /// Finger down. Hosts with touch input report it; terminals never do.
    TouchStart,
    /// Moved with the primary button held, or a finger moved.
    Drag,
    /// Button released.
    Release,
    /// Wheel delta in lines.
    Wheel { delta_x: f64, delta_y: f64 },
}

/// A pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
    pub modifiers: Modifiers,
    pub at: Instant,
}

impl PointerEvent {
    /// Creates an event stamped now.
    pub fn new(kind: PointerKind, position: Point) -> Self {
        Self {
            kind,
            position,
            modifiers: Modifiers::NONE,
            at: Instant::now(),
        }
    }

    /// Converts a crossterm mouse event; `None` for plain moves and the
    /// middle button.
    pub fn from_mouse(event: MouseEvent) -> Option<Self> {
        let kind = match event.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerKind::Press(PointerButton::Primary),
            MouseEventKind::Down(MouseButton::Right) => PointerKind::Press(PointerButton::Secondary),
            MouseEventKind::Drag(MouseButton::Left) => PointerKind::Drag,
            MouseEventKind::Up(_) => PointerKind::Release,
            MouseEventKind::ScrollUp => PointerKind::Wheel {
                delta_x: 0.0,
                delta_y: -1.0,
            },
            MouseEventKind::ScrollDown => PointerKind::Wheel {
                delta_x: 0.0,
                delta_y: 1.0,
            },
            MouseEventKind::ScrollLeft => PointerKind::Wheel {
                delta_x: -1.0,
                delta_y: 0.0,
            },
            MouseEventKind::ScrollRight => PointerKind::Wheel {
                delta_x: 1.0,
                delta_y: 0.0,
            },
            _ => return None,
        };
        Some(Self {
            kind,
            position: Point::new(i32::from(event.column), i32::from(event.row)),
            modifiers: event.modifiers.into(),
            at: Instant::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 4,
            row: 7,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    #[test]
    fn test_converts_press_and_wheel() {
        let press = PointerEvent::from_mouse(mouse(MouseEventKind::Down(MouseButton::Right))).unwrap();
        assert_eq!(press.kind, PointerKind::Press(PointerButton::Secondary));
        assert_eq!(press.position, Point::new(4, 7));
        assert!(press.modifiers.shift);

        let wheel = PointerEvent::from_mouse(mouse(MouseEventKind::ScrollDown)).unwrap();
        assert_eq!(
            wheel.kind,
            PointerKind::Wheel {
                delta_x: 0.0,
                delta_y: 1.0
            }
        );
        assert!(PointerEvent::from_mouse(mouse(MouseEventKind::Moved)).is_none());
    }
}
