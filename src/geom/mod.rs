//! Geometry
//!
//! Value types for 2D layout and hit-testing:
//! - Point: vector and position, scaled component-wise by other points
//! - Rect: origin plus size, possibly "virtual" until normalized
//! - Circle: center plus radius, for round collision shapes
//! - Shape: either of the two, as collision tests see them
//! - angle: scalar helpers (mirror, wrap, in_angle, lerp, step)

pub mod angle;
pub mod point;
pub mod rect;

use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

pub use point::Point;
pub use rect::{Edge, Rect};

/// Anything an executant can carry between coordinate spaces.
///
/// Translation comes from adding or subtracting a point, scaling from
/// multiplying or dividing by one. `Point` and `Rect` both qualify; a rect
/// scaled by a negative factor comes out virtual.
pub trait Spatial:
    Copy
    + Add<Point, Output = Self>
    + Sub<Point, Output = Self>
    + Mul<Point, Output = Self>
    + Div<Point, Output = Self>
{
}

impl<T> Spatial for T where
    T: Copy
        + Add<Point, Output = T>
        + Sub<Point, Output = T>
        + Mul<Point, Output = T>
        + Div<Point, Output = T>
{
}

/// A circle. Coordinate transforms move the center only; the radius stays
/// in the space it was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Strict overlap: circles that only touch do not collide.
    pub fn collide(&self, other: &Circle) -> bool {
        self.center.distance_to(other.center) < self.radius + other.radius
    }

    /// Strict overlap with a normalized rect, via the rect point nearest the center.
    pub fn collide_rect(&self, rect: &Rect) -> bool {
        let nearest = Point::new(
            self.center.x.clamp(rect.left(), rect.right()),
            self.center.y.clamp(rect.top(), rect.bottom()),
        );
        self.center.distance_to(nearest) < self.radius
    }
}

/// A collision shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
}

impl Shape {
    /// Overlap test against a normalized rect.
    pub fn against_rect(&self, rect: &Rect) -> bool {
        match self {
            Shape::Rect(mine) => mine.collide(rect),
            Shape::Circle(mine) => mine.collide_rect(rect),
        }
    }

    pub fn against_circle(&self, circle: &Circle) -> bool {
        match self {
            Shape::Rect(mine) => circle.collide_rect(mine),
            Shape::Circle(mine) => mine.collide(circle),
        }
    }

    pub fn collide(&self, other: &Shape) -> bool {
        match other {
            Shape::Rect(rect) => self.against_rect(rect),
            Shape::Circle(circle) => self.against_circle(circle),
        }
    }

    /// Moves the shape into another space. Rects go through `map_rect` and
    /// come out normalized; circles only move their center.
    #[must_use]
    pub fn adapt(self, map_point: impl Fn(Point) -> Point, map_rect: impl Fn(Rect) -> Rect) -> Self {
        match self {
            Shape::Rect(rect) => Shape::Rect(map_rect(rect).normalize()),
            Shape::Circle(circle) => Shape::Circle(Circle::new(map_point(circle.center), circle.radius)),
        }
    }
}
