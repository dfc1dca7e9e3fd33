//! 2D Point
//!
//! `Point` is a plain copyable vector. Arithmetic goes through the std
//! operator traits, so every expression produces a fresh value and nothing
//! is ever aliased by accident. Multiplying or dividing by another `Point`
//! works component-wise, which is what scale factors need.

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A 2D vector or position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };
    pub const ONE: Point = Point { x: 1.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` (radians, y grows downward).
    pub fn circle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Both components set to `value`.
    pub const fn regular(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn set(&mut self, x: f64, y: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Component-wise sign: -1, 0 or 1.
    pub fn sign(self) -> Self {
        fn sign(v: f64) -> f64 {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                v
            }
        }
        Self::new(sign(self.x), sign(self.y))
    }

    /// Component-wise floor.
    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }

    /// Euclidean length.
    pub fn distance(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self - other).distance()
    }

    /// Manhattan length.
    pub fn axisdist(self) -> f64 {
        self.x.abs() + self.y.abs()
    }

    pub fn axisdist_to(self, other: Point) -> f64 {
        (self - other).axisdist()
    }

    /// Direction of this vector in radians, in (-PI/2, 3PI/2).
    /// The zero vector has no direction and yields NaN.
    pub fn angle(self) -> f64 {
        let angle = (self.y / self.x).atan();
        if self.x < 0.0 {
            angle + PI
        } else {
            angle
        }
    }

    /// Direction from `other` toward this point.
    pub fn angle_from(self, other: Point) -> f64 {
        (self - other).angle()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
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

impl Mul for Point {
    type Output = Point;
    fn mul(self, rhs: Point) -> Point {
        Point::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div for Point {
    type Output = Point;
    fn div(self, rhs: Point) -> Point {
        Point::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f64> for Point {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl MulAssign for Point {
    fn mul_assign(&mut self, rhs: Point) {
        self.x *= rhs.x;
        self.y *= rhs.y;
    }
}

impl DivAssign for Point {
    fn div_assign(&mut self, rhs: Point) {
        self.x /= rhs.x;
        self.y /= rhs.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_arithmetic() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(p + Point::new(1.0, 1.0), Point::new(4.0, 5.0));
        assert_eq!(p - Point::new(1.0, 2.0), Point::new(2.0, 2.0));
        assert_eq!(p * 2.0, Point::new(6.0, 8.0));
        assert_eq!(p * Point::new(2.0, 0.5), Point::new(6.0, 2.0));
        assert_eq!(p / Point::new(3.0, 2.0), Point::new(1.0, 2.0));
        assert_eq!(-p, Point::new(-3.0, -4.0));
    }

    #[test]
    fn test_operators_leave_operands_alone() {
        let p = Point::new(1.0, 2.0);
        let q = p + Point::ONE;
        assert_eq!(p, Point::new(1.0, 2.0));
        assert_eq!(q, Point::new(2.0, 3.0));
    }

    #[test]
    fn test_distances() {
        let p = Point::new(3.0, -4.0);
        assert!(approx(p.distance(), 5.0));
        assert!(approx(p.axisdist(), 7.0));
        assert!(approx(Point::new(4.0, 4.0).distance_to(Point::new(1.0, 0.0)), 5.0));
    }

    #[test]
    fn test_angle_quadrants() {
        assert!(approx(Point::new(1.0, 0.0).angle(), 0.0));
        assert!(approx(Point::new(0.0, 1.0).angle(), PI / 2.0));
        assert!(approx(Point::new(-1.0, 0.0).angle(), PI));
        assert!(approx(Point::new(-1.0, -1.0).angle(), PI * 1.25));
        assert!(Point::ZERO.angle().is_nan());
    }

    #[test]
    fn test_circle_roundtrip() {
        let angle = 0.7;
        let p = Point::circle(angle) * 3.0;
        assert!(approx(p.angle(), angle));
        assert!(approx(p.distance(), 3.0));
    }

    #[test]
    fn test_sign_and_floor() {
        assert_eq!(Point::new(-2.5, 0.0).sign(), Point::new(-1.0, 0.0));
        assert_eq!(Point::new(-2.5, 1.7).floor(), Point::new(-3.0, 1.0));
    }
}
