//! Scalar helpers for angles and ranges.

use std::f64::consts::PI;

pub const PI90: f64 = PI / 2.0;
pub const PI180: f64 = PI;
pub const PI270: f64 = PI * 1.5;
pub const PI360: f64 = PI * 2.0;

/// Reflects `value` across `pivot`.
pub fn mirror(value: f64, pivot: f64) -> f64 {
    value + (pivot - value) * 2.0
}

/// Wraps `value` into `[start, end)`.
pub fn wrap(value: f64, end: f64, start: f64) -> f64 {
    let width = end - start;
    let mut d = (value - start) % width;
    if d < 0.0 {
        d += width;
    }
    start + d
}

/// Wraps an angle into `[0, 2PI)`.
pub fn wrap_angle(angle: f64) -> f64 {
    wrap(angle, PI360, 0.0)
}

/// Whether `angle` lies on the arc from `begin` to `end`.
///
/// Bounds may lie outside one turn. Sweeping forward (`begin < end`) covers
/// the arc counting up from `begin`, sweeping backward covers the one counting
/// down. `begin` itself is inside, `end` is not. Arcs wider than a full turn
/// are not supported.
pub fn in_angle(angle: f64, begin: f64, end: f64) -> bool {
    let forward = begin < end;

    let angle = wrap_angle(angle);
    let begin = wrap_angle(begin);
    let end = wrap_angle(end);

    if angle == begin {
        return true;
    }

    let ordered = begin < end;
    let min = begin.min(end);
    let max = begin.max(end);
    let inside = min < angle && angle < max;

    inside ^ forward ^ ordered
}

pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    (end - start) * t + start
}

/// Snaps `value` down to a multiple of `width`.
pub fn step(value: f64, width: f64) -> f64 {
    (value / width).floor() * width
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mirror() {
        assert_eq!(mirror(1.0, 3.0), 5.0);
        assert!(approx(mirror(0.25, PI90), PI - 0.25));
    }

    #[test]
    fn test_wrap() {
        assert!(approx(wrap(7.0, 5.0, 0.0), 2.0));
        assert!(approx(wrap(-1.0, 5.0, 0.0), 4.0));
        assert!(approx(wrap(12.0, 20.0, 10.0), 12.0));
        assert!(approx(wrap_angle(-PI90), PI270));
    }

    #[test]
    fn test_in_angle_across_zero() {
        let deg = |d: f64| d.to_radians();
        // forward and ordered bounds across zero
        assert!(in_angle(0.0, deg(-90.0), deg(90.0)));
        // backward sweep from 90 down to -90 also passes 0
        assert!(in_angle(0.0, deg(90.0), deg(-90.0)));
        assert!(!in_angle(0.0, deg(90.0), deg(270.0)));
        assert!(!in_angle(0.0, deg(270.0), deg(90.0)));
        assert!(in_angle(deg(180.0), deg(90.0), deg(270.0)));
    }

    #[test]
    fn test_in_angle_bounds() {
        assert!(in_angle(1.0, 1.0, 2.0));
        assert!(!in_angle(2.0, 1.0, 2.0));
    }

    #[test]
    fn test_lerp_and_step() {
        assert_eq!(lerp(10.0, 20.0, 0.25), 12.5);
        assert_eq!(step(17.0, 5.0), 15.0);
        assert_eq!(step(-1.0, 5.0), -5.0);
    }
}
