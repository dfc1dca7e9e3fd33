//! Rectangles
//!
//! A `Rect` is an origin (`lt`, the left-top corner) plus a `size`. Transforms
//! can leave the size negative on an axis; such a "virtual" rect still composes
//! correctly but must be `normalize`d before edge or containment queries.
//!
//! Edge setters move the named edge only: setting `right` changes the width,
//! setting `left` shifts the origin and shrinks the width to keep `right` put.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left-top corner
    pub lt: Point,
    /// Width and height, possibly negative before normalization
    pub size: Point,
}

impl Rect {
    pub const ZERO: Rect = Rect { lt: Point::ZERO, size: Point::ZERO };
    pub const ONE: Rect = Rect { lt: Point::ZERO, size: Point::ONE };

    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            lt: Point::new(x, y),
            size: Point::new(w, h),
        }
    }

    pub const fn from_parts(lt: Point, size: Point) -> Self {
        Self { lt, size }
    }

    /// Rect spanning from `lt` to `rb`.
    pub fn by_corner(lt: Point, rb: Point) -> Self {
        Self::from_parts(lt, rb - lt)
    }

    /// Rect of `size` centered on `center`.
    pub fn by_center(center: Point, size: Point) -> Self {
        Self::from_parts(center - size / 2.0, size)
    }

    /// Rect reaching `radius` out from `center` on each axis.
    pub fn by_radius(center: Point, radius: Point) -> Self {
        Self::from_parts(center - radius, radius * 2.0)
    }

    /// Rect of `size` placed so that the relative point `pivot` sits on the
    /// origin. A pivot of (0.5, 0.5) centers it, (0, 0) puts the origin at
    /// the left-top corner.
    pub fn by_pivot(pivot: Point, size: Point) -> Self {
        Self::from_parts(size * -pivot, size)
    }

    pub fn left(&self) -> f64 {
        self.lt.x
    }

    pub fn top(&self) -> f64 {
        self.lt.y
    }

    pub fn right(&self) -> f64 {
        self.lt.x + self.size.x
    }

    pub fn bottom(&self) -> f64 {
        self.lt.y + self.size.y
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    pub fn set_left(&mut self, left: f64) {
        self.size.x -= left - self.lt.x;
        self.lt.x = left;
    }

    pub fn set_top(&mut self, top: f64) {
        self.size.y -= top - self.lt.y;
        self.lt.y = top;
    }

    pub fn set_right(&mut self, right: f64) {
        self.size.x = right - self.lt.x;
    }

    pub fn set_bottom(&mut self, bottom: f64) {
        self.size.y = bottom - self.lt.y;
    }

    pub fn set_width(&mut self, width: f64) {
        self.size.x = width;
    }

    pub fn set_height(&mut self, height: f64) {
        self.size.y = height;
    }

    /// Value of the named edge.
    pub fn edge(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Left => self.left(),
            Edge::Top => self.top(),
            Edge::Right => self.right(),
            Edge::Bottom => self.bottom(),
        }
    }

    pub fn center(&self) -> Point {
        self.point_at(Point::regular(0.5))
    }

    /// Moves the rect so its center lands on `center`, keeping the size.
    pub fn set_center(&mut self, center: Point) {
        self.lt = center - self.size / 2.0;
    }

    /// Right-bottom corner.
    pub fn rb(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Point at relative position `pivot`, where (0,0) is `lt` and (1,1) is `rb`.
    pub fn point_at(&self, pivot: Point) -> Point {
        self.lt + self.size * pivot
    }

    /// Flips negative axes so the size is non-negative, keeping the covered area.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.size.x < 0.0 {
            self.lt.x += self.size.x;
            self.size.x = -self.size.x;
        }
        if self.size.y < 0.0 {
            self.lt.y += self.size.y;
            self.size.y = -self.size.y;
        }
        self
    }

    /// Moves the origin by `by` and shrinks the size by the same amount,
    /// keeping the right-bottom corner in place.
    #[must_use]
    pub fn neck(mut self, by: Point) -> Self {
        self.lt += by;
        self.size -= by;
        self
    }

    /// Grows the rect by `amount` on every side.
    #[must_use]
    pub fn swell(mut self, amount: f64) -> Self {
        self.lt -= Point::regular(amount);
        self.size += Point::regular(amount * 2.0);
        self
    }

    /// Whether `point` lies inside. Left and top edges are inside, right and
    /// bottom edges are not.
    pub fn inside(&self, point: Point) -> bool {
        !(point.x < self.lt.x
            || self.right() <= point.x
            || point.y < self.lt.y
            || self.bottom() <= point.y)
    }

    /// Whether the two rects overlap. Rects that only touch do not collide.
    pub fn collide(&self, other: &Rect) -> bool {
        !(other.right() <= self.lt.x
            || other.bottom() <= self.lt.y
            || self.right() <= other.lt.x
            || self.bottom() <= other.lt.y)
    }

    /// Overlapping area. Disjoint rects give a virtual (negative) size.
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::by_corner(
            Point::new(self.left().max(other.left()), self.top().max(other.top())),
            Point::new(self.right().min(other.right()), self.bottom().min(other.bottom())),
        )
    }

    /// Cells of a `dimension`-sized grid the rect touches, as a rect in cell units.
    pub fn grid(&self, dimension: f64) -> Rect {
        let x = (self.lt.x / dimension).floor();
        let y = (self.lt.y / dimension).floor();
        let r = ((self.right() - 1.0) / dimension).floor() + 1.0;
        let b = ((self.bottom() - 1.0) / dimension).floor() + 1.0;
        Rect::by_corner(Point::new(x, y), Point::new(r, b))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {} {}x{}]",
            self.lt.x, self.lt.y, self.size.x, self.size.y
        )
    }
}

/// Adding a point moves the rect.
impl Add<Point> for Rect {
    type Output = Rect;
    fn add(self, rhs: Point) -> Rect {
        Rect::from_parts(self.lt + rhs, self.size)
    }
}

impl Sub<Point> for Rect {
    type Output = Rect;
    fn sub(self, rhs: Point) -> Rect {
        Rect::from_parts(self.lt - rhs, self.size)
    }
}

/// Scaling applies to both origin and size.
impl Mul<Point> for Rect {
    type Output = Rect;
    fn mul(self, rhs: Point) -> Rect {
        Rect::from_parts(self.lt * rhs, self.size * rhs)
    }
}

impl Mul<f64> for Rect {
    type Output = Rect;
    fn mul(self, rhs: f64) -> Rect {
        Rect::from_parts(self.lt * rhs, self.size * rhs)
    }
}

impl Div<Point> for Rect {
    type Output = Rect;
    fn div(self, rhs: Point) -> Rect {
        Rect::from_parts(self.lt / rhs, self.size / rhs)
    }
}

impl Div<f64> for Rect {
    type Output = Rect;
    fn div(self, rhs: f64) -> Rect {
        Rect::from_parts(self.lt / rhs, self.size / rhs)
    }
}

/// One side of a rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Edge {
    /// Left and right are vertical lines, placed along the x axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Edge::Left | Edge::Right)
    }

    pub fn label(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Top => "top",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
        assert_eq!(r.rb(), Point::new(40.0, 60.0));
    }

    #[test]
    fn test_edge_setters_change_size() {
        let mut r = Rect::new(10.0, 10.0, 20.0, 20.0);
        r.set_right(50.0);
        assert_eq!(r.lt, Point::new(10.0, 10.0));
        assert_eq!(r.width(), 40.0);

        r.set_left(20.0);
        assert_eq!(r.left(), 20.0);
        assert_eq!(r.right(), 50.0);

        r.set_top(0.0);
        assert_eq!(r.height(), 30.0);
        assert_eq!(r.bottom(), 30.0);
    }

    #[test]
    fn test_constructors() {
        let c = Rect::by_corner(Point::new(1.0, 2.0), Point::new(4.0, 6.0));
        assert_eq!(c, Rect::new(1.0, 2.0, 3.0, 4.0));

        let m = Rect::by_center(Point::new(10.0, 10.0), Point::new(4.0, 2.0));
        assert_eq!(m, Rect::new(8.0, 9.0, 4.0, 2.0));

        let r = Rect::by_radius(Point::new(10.0, 10.0), Point::new(3.0, 1.0));
        assert_eq!(r, Rect::new(7.0, 9.0, 6.0, 2.0));

        let p = Rect::by_pivot(Point::new(0.5, 1.0), Point::new(10.0, 20.0));
        assert_eq!(p, Rect::new(-5.0, -20.0, 10.0, 20.0));
    }

    #[test]
    fn test_normalize_flips_negative_size() {
        let r = Rect::new(10.0, 10.0, -4.0, -6.0).normalize();
        assert_eq!(r, Rect::new(6.0, 4.0, 4.0, 6.0));
        let same = Rect::new(1.0, 1.0, 2.0, 2.0);
        assert_eq!(same.normalize(), same);
    }

    #[test]
    fn test_inside_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.inside(Point::new(0.0, 0.0)));
        assert!(r.inside(Point::new(9.99, 5.0)));
        assert!(!r.inside(Point::new(10.0, 5.0)));
        assert!(!r.inside(Point::new(5.0, 10.0)));
        assert!(!r.inside(Point::new(-0.1, 5.0)));
    }

    #[test]
    fn test_collide_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.collide(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.collide(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.collide(&Rect::new(0.0, 10.0, 5.0, 5.0)));
        assert!(!a.collide(&Rect::new(-5.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_transform_ops() {
        let r = Rect::new(2.0, 4.0, 6.0, 8.0);
        assert_eq!(r + Point::new(1.0, 1.0), Rect::new(3.0, 5.0, 6.0, 8.0));
        assert_eq!(r * Point::new(2.0, 0.5), Rect::new(4.0, 2.0, 12.0, 4.0));
        assert_eq!(r / 2.0, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(r.neck(Point::new(1.0, 1.0)), Rect::new(3.0, 5.0, 5.0, 7.0));
        assert_eq!(r.swell(1.0), Rect::new(1.0, 3.0, 8.0, 10.0));
    }

    #[test]
    fn test_intersect_and_grid() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 2.0, 10.0, 4.0);
        assert_eq!(a.intersect(&b), Rect::new(5.0, 2.0, 5.0, 4.0));

        let cells = Rect::new(5.0, 15.0, 20.0, 10.0).grid(10.0);
        assert_eq!(cells, Rect::by_corner(Point::new(0.0, 1.0), Point::new(3.0, 3.0)));
    }
}
