//! Pointer gesture tracking.

use std::collections::VecDeque;
use std::time::Duration;
use std::time::Instant;

use super::Point;

/// Kind of pointer driving a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Touch contact.
    Touch,
    /// Mouse drag on the surface.
    Drag,
}

/// An active drag/touch gesture with recent pointer samples.
#[derive(Debug, Clone)]
pub struct Gesture {
    kind: GestureKind,
    last: Point,
    samples: VecDeque<(Instant, Point)>,
}

impl Gesture {
    pub(crate) fn new(kind: GestureKind, pointer: Point, at: Instant) -> Self {
        Self {
            kind,
            last: pointer,
            samples: VecDeque::from([(at, pointer)]),
        }
    }

    /// Kind of pointer.
    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    /// Records a pointer sample and returns the movement since the last one.
    pub(crate) fn sample(&mut self, pointer: Point, at: Instant, window: Duration) -> Point {
        let delta = Point::new(
            pointer.x.saturating_sub(self.last.x),
            pointer.y.saturating_sub(self.last.y),
        );
        self.last = pointer;
        self.samples.push_back((at, pointer));
        while let Some((oldest, _)) = self.samples.front()
            && self.samples.len() > 2
            && at.saturating_duration_since(*oldest) > window
        {
            self.samples.pop_front();
        }
        delta
    }

    /// Pointer velocity in px/ms over the samples within `window` of `at`.
    ///
    /// Zero when the pointer rested longer than the window before release.
    pub(crate) fn velocity(&self, at: Instant, window: Duration) -> (f64, f64) {
        let recent: Vec<&(Instant, Point)> = self
            .samples
            .iter()
            .filter(|(time, _)| at.saturating_duration_since(*time) <= window)
            .collect();
        let (Some(first), Some(last)) = (recent.first(), recent.last()) else {
            return (0.0, 0.0);
        };
        let elapsed = last.0.saturating_duration_since(first.0).as_secs_f64() * 1000.0;
        if elapsed <= 0.0 {
            return (0.0, 0.0);
        }
        (
            (last.1.x - first.1.x) as f64 / elapsed,
            (last.1.y - first.1.y) as f64 / elapsed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_uses_recent_samples() {
        let start = Instant::now();
        let window = Duration::from_millis(100);
        let mut gesture = Gesture::new(GestureKind::Touch, Point::new(0, 500), start);

        // slow start outside the window
        gesture.sample(Point::new(0, 490), start + Duration::from_millis(200), window);
        gesture.sample(Point::new(0, 390), start + Duration::from_millis(250), window);
        let delta = gesture.sample(Point::new(0, 290), start + Duration::from_millis(300), window);

        assert_eq!(delta, Point::new(0, -100));
        let (vx, vy) = gesture.velocity(start + Duration::from_millis(300), window);
        assert_eq!(vx, 0.0);
        assert!((vy - (-2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_resting_pointer_has_no_velocity() {
        let start = Instant::now();
        let window = Duration::from_millis(100);
        let mut gesture = Gesture::new(GestureKind::Drag, Point::ZERO, start);
        gesture.sample(Point::new(50, 0), start + Duration::from_millis(10), window);

        let (vx, _) = gesture.velocity(start + Duration::from_millis(500), window);
        assert_eq!(vx, 0.0);
    }
}
