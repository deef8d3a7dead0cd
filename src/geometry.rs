//! Points and rectangles in editor space.
//!
//! All coordinates are logical pixels in the editor's coordinate system, the
//! same space Slint reports pointer positions in.

use std::ops::{Add, Sub};

/// A 2D point (or offset) in editor space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Translate this point by an `(offset_x, offset_y)` pair.
    pub fn offset(self, offset_x: f32, offset_y: f32) -> Self {
        Self::new(self.x + offset_x, self.y + offset_y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<slint::LogicalPosition> for Point {
    fn from(pos: slint::LogicalPosition) -> Self {
        Self::new(pos.x, pos.y)
    }
}

impl From<Point> for slint::LogicalPosition {
    fn from(p: Point) -> Self {
        slint::LogicalPosition::new(p.x, p.y)
    }
}

/// Axis-aligned rectangle: origin plus size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Same size, origin moved by `delta`.
    pub fn translated(&self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}
