//! Points, rectangles and the surfaces gestures are recognized over.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

/// A 2D point, in client space or renderer space depending on context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An on-screen rectangle, as reported by a bounding-rect query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Distance from the client area's left edge.
    pub left: f32,
    /// Distance from the client area's top edge.
    pub top: f32,
    /// Width in client pixels.
    pub width: f32,
    /// Height in client pixels.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Check if a point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// Anything with an on-screen bounding rectangle, typically a canvas element.
pub trait Surface {
    /// Current bounding rectangle in client coordinates.
    fn bounding_client_rect(&self) -> Rect;
}

/// A surface whose rectangle is set by the host.
///
/// Native hosts (and tests) use this where no DOM is available; update it
/// whenever the window or canvas moves.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    rect: Cell<Rect>,
}

impl HeadlessSurface {
    /// Create a surface with the given rectangle.
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            rect: Cell::new(rect),
        }
    }

    /// Move or resize the surface.
    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }
}

impl Surface for HeadlessSurface {
    fn bounding_client_rect(&self) -> Rect {
        self.rect.get()
    }
}
