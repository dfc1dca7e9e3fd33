//! Walkers: positions along a rail as a function of progress.
//!
//! Every rail starts at the origin at progress 0.0 and reaches its end at
//! 1.0. Before the rail is consulted the progress goes through the `style`
//! polator (what happens outside 0.0..=1.0: stop, loop, pingpong) and then
//! the `timing` polator (easing). The `offset` slides the whole rail.

use crate::geom::Point;

use super::polator::{Polator, Timing};

/// The settings every walker shares.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub style: Polator,
    pub timing: Polator,
    pub offset: Point,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            style: Timing::Stop.into(),
            timing: Timing::Linear.into(),
            offset: Point::ZERO,
        }
    }
}

pub trait Walker {
    fn track(&self) -> &Track;

    fn track_mut(&mut self) -> &mut Track;

    /// Position on the bare rail at an already polated progress.
    fn rail(&self, progress: f64) -> Point;

    /// Position at `progress`, 0.0 being the start and 1.0 the end.
    fn get(&self, progress: f64) -> Point {
        let track = self.track();
        let progress = track.timing.get(track.style.get(progress));
        self.rail(progress) + track.offset
    }
}

/// Straight line from the origin to `dest`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineWalker {
    pub track: Track,
    pub dest: Point,
}

impl LineWalker {
    pub fn new(dest: Point) -> Self {
        Self {
            track: Track::default(),
            dest,
        }
    }

    pub fn with_timing(mut self, timing: impl Into<Polator>) -> Self {
        self.track.timing = timing.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<Polator>) -> Self {
        self.track.style = style.into();
        self
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.track.offset = offset;
        self
    }
}

impl Walker for LineWalker {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn rail(&self, progress: f64) -> Point {
        self.dest * progress
    }
}

/// Circular arc around `center`, starting at the origin and turning by
/// `rotate` radians (clockwise positive, y pointing down).
#[derive(Debug, Clone, PartialEq)]
pub struct ArcWalker {
    pub track: Track,
    center: Point,
    rotate: f64,
    radius: f64,
    start: f64,
}

impl ArcWalker {
    pub fn new(center: Point, rotate: f64) -> Self {
        Self {
            track: Track::default(),
            center,
            rotate,
            radius: center.distance(),
            start: (-center).angle(),
        }
    }

    pub fn with_timing(mut self, timing: impl Into<Polator>) -> Self {
        self.track.timing = timing.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<Polator>) -> Self {
        self.track.style = style.into();
        self
    }
}

impl Walker for ArcWalker {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn rail(&self, progress: f64) -> Point {
        let angle = self.start + self.rotate * progress;
        Point::circle(angle) * self.radius + self.center
    }
}

/// Several walkers chained end to end. Each leg owns the progress up to its
/// percentage mark; the next leg starts where the previous one ended.
pub struct CoalesceWalker {
    pub track: Track,
    legs: Vec<(f64, Box<dyn Walker>)>,
}

impl CoalesceWalker {
    /// `legs` pairs each walker with the percentage (0..=100) at which it
    /// ends. Marks must ascend and the last should be 100. Each leg's offset
    /// is overwritten to chain the rail.
    pub fn new(legs: Vec<(f64, Box<dyn Walker>)>) -> Self {
        let mut legs = legs;
        let mut joint = Point::ZERO;
        for (_, walker) in &mut legs {
            walker.track_mut().offset = joint;
            joint = walker.get(1.0);
        }
        Self {
            track: Track::default(),
            legs,
        }
    }

    /// Chain of straight lines, each given by its displacement.
    pub fn lines(legs: impl IntoIterator<Item = (f64, Point)>) -> Self {
        Self::new(
            legs.into_iter()
                .map(|(mark, dest)| (mark, Box::new(LineWalker::new(dest)) as Box<dyn Walker>))
                .collect(),
        )
    }

    pub fn with_timing(mut self, timing: impl Into<Polator>) -> Self {
        self.track.timing = timing.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<Polator>) -> Self {
        self.track.style = style.into();
        self
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.track.offset = offset;
        self
    }
}

impl Walker for CoalesceWalker {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn rail(&self, progress: f64) -> Point {
        let percent = progress * 100.0;
        let mut previous = 0.0;
        for (mark, walker) in &self.legs {
            if percent <= *mark {
                return walker.get((percent - previous) / (mark - previous));
            }
            previous = *mark;
        }
        // beyond the last mark: extrapolate the last leg
        match self.legs.last() {
            Some((_, walker)) => walker.get(1.0),
            None => Point::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::angle::PI180;

    fn near(a: Point, b: Point) -> bool {
        a.distance_to(b) < 1e-6
    }

    #[test]
    fn test_line_styles() {
        let walker = LineWalker::new(Point::new(200.0, 200.0));
        assert!(near(walker.get(0.3), Point::new(60.0, 60.0)));
        assert!(near(walker.get(1.3), Point::new(200.0, 200.0)));
        assert!(near(walker.get(-0.3), Point::ZERO));

        let shifted = LineWalker::new(Point::new(200.0, 200.0)).with_offset(Point::new(100.0, 100.0));
        assert!(near(shifted.get(0.3), Point::new(160.0, 160.0)));

        let bounce = LineWalker::new(Point::new(200.0, 200.0)).with_style(Timing::Pingpong);
        assert!(near(bounce.get(1.1), Point::new(180.0, 180.0)));

        let looped = LineWalker::new(Point::new(200.0, 200.0)).with_style(Timing::Loop);
        assert!(near(looped.get(-0.2), Point::new(160.0, 160.0)));

        let eased = LineWalker::new(Point::new(200.0, 200.0)).with_timing(Timing::Easein);
        assert!(near(eased.get(0.5), Point::new(175.0, 175.0)));
    }

    #[test]
    fn test_arc_starts_at_origin() {
        let walker = ArcWalker::new(Point::new(10.0, 0.0), PI180);
        assert!(near(walker.get(0.0), Point::ZERO));
        assert!(near(walker.get(0.5), Point::new(10.0, -10.0)));
        assert!(near(walker.get(1.0), Point::new(20.0, 0.0)));
    }

    #[test]
    fn test_coalesce_chains_legs() {
        let walker = CoalesceWalker::lines([
            (25.0, Point::new(100.0, 0.0)),
            (75.0, Point::new(0.0, 100.0)),
            (100.0, Point::new(-100.0, 0.0)),
        ])
        .with_offset(Point::new(10.0, 10.0));

        assert!(near(walker.get(0.0), Point::new(10.0, 10.0)));
        assert!(near(walker.get(0.25), Point::new(110.0, 10.0)));
        assert!(near(walker.get(0.5), Point::new(110.0, 60.0)));
        assert!(near(walker.get(1.0), Point::new(10.0, 110.0)));
    }
}
