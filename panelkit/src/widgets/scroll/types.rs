//! Scroll geometry types.

/// A scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// Both axes, horizontal first.
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];
}

/// A signed pixel pair (offset, velocity or delta).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0, y: 0 };

    /// Creates a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component on an axis.
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Sets the component on an axis.
    pub fn set(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }

    /// Whether both components are zero.
    pub fn is_zero(self) -> bool {
        self == Point::ZERO
    }
}

/// An unsigned pixel extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extent along an axis.
    pub fn get(self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// Normalization mode of a wheel delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WheelMode {
    /// Delta in pixels.
    #[default]
    Pixel,
    /// Delta in lines.
    Line,
    /// Delta in pages (viewport lengths).
    Page,
}

/// Track and handle placement of one scrollbar.
///
/// Coordinates are relative to the scrollable surface. The handle length
/// follows `viewport / content`, its position follows `position / offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackGeometry {
    /// Axis the track scrolls.
    pub axis: Option<Axis>,
    /// X position of the track.
    pub x: i32,
    /// Y position of the track.
    pub y: i32,
    /// Track width.
    pub width: i32,
    /// Track height.
    pub height: i32,
    /// Position of the handle within the track.
    pub handle_pos: i32,
    /// Length of the handle.
    pub handle_size: i32,
}

impl TrackGeometry {
    fn vertical(&self) -> bool {
        self.axis == Some(Axis::Y)
    }

    /// Track length along its axis.
    pub fn length(&self) -> i32 {
        if self.vertical() { self.height } else { self.width }
    }

    /// Distance the handle can travel.
    pub fn travel(&self) -> i32 {
        (self.length() - self.handle_size).max(0)
    }

    /// Check if a point is within the track.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Check if a point is on the handle.
    pub fn handle_contains(&self, x: i32, y: i32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let rel = if self.vertical() { y - self.y } else { x - self.x };
        rel >= self.handle_pos && rel < self.handle_pos + self.handle_size
    }

    /// Convert a point on the track to a scroll ratio (0.0 - 1.0), with
    /// `grab_offset` being where within the handle the pointer holds it.
    pub fn position_to_ratio_with_offset(&self, x: i32, y: i32, grab_offset: i32) -> f64 {
        let travel = self.travel();
        if travel == 0 {
            return 0.0;
        }
        let rel = if self.vertical() { y - self.y } else { x - self.x };
        ((rel - grab_offset) as f64 / travel as f64).clamp(0.0, 1.0)
    }

    /// Convert a point on the track to a scroll ratio, centering the handle.
    pub fn position_to_ratio(&self, x: i32, y: i32) -> f64 {
        self.position_to_ratio_with_offset(x, y, self.handle_size / 2)
    }
}
