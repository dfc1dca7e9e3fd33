//! Movers
//!
//! Behaviors that change the host position over time. Speeds are given in
//! px/s and kept in px/ms, the unit of frame deltas. All movers except the
//! skater skip their first update after attach, so a mover installed in the
//! middle of a frame does not jump with a stale delta.

use std::rc::Rc;

use crate::core::{AntId, Behavior, Cx, Delegate, Slot, Stage};
use crate::error::Result;
use crate::geom::angle::{in_angle, mirror, wrap_angle, PI180, PI90};
use crate::geom::{Edge, Point, Rect};
use crate::motion::Walker;

/// Something that moves a bare position, without an executant around it.
/// Particles drift with these.
pub trait Drift {
    fn drift(&mut self, stage: &mut Stage, position: &mut Point, delta: f64) -> Result<()>;

    /// A particle whose life drift has expired is dropped.
    fn expired(&self) -> bool {
        false
    }
}

/// Heads for `dest` in a straight line and stops there.
#[derive(Debug)]
pub struct DestineMover {
    pub dest: Point,
    /// px/ms
    pub speed: f64,
    /// Bid own removal on arrival
    pub autoremove: bool,
    on_finish: Rc<Delegate<AntId>>,
}

impl DestineMover {
    /// `speed` in px/s.
    pub fn new(dest: Point, speed: f64) -> Self {
        Self {
            dest,
            speed: speed / 1000.0,
            autoremove: false,
            on_finish: Rc::default(),
        }
    }

    pub fn autoremove(mut self) -> Self {
        self.autoremove = true;
        self
    }

    /// Fired with the host when it arrives.
    pub fn on_finish(&self) -> Rc<Delegate<AntId>> {
        Rc::clone(&self.on_finish)
    }
}

impl Behavior for DestineMover {
    fn primes(&self) -> bool {
        true
    }

    fn behave(&mut self, cx: &mut Cx<'_>, delta: f64) -> Result<()> {
        if self.speed == 0.0 {
            return Ok(());
        }
        let position = cx.position_mut()?;
        let vector = self.dest - *position;
        let distance = vector.distance();
        if distance == 0.0 {
            return Ok(());
        }

        let share = self.speed * delta / distance;
        if share < 1.0 {
            *position += vector * share;
            return Ok(());
        }

        *position = self.dest;
        let host = cx.host;
        Rc::clone(&self.on_finish).trigger(cx.stage, &host)?;
        if self.autoremove {
            cx.retire()?;
        }
        Ok(())
    }

    fn speed_mut(&mut self) -> Option<&mut f64> {
        Some(&mut self.speed)
    }
}

/// Moves along a fixed direction. A NaN angle stands still.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleMover {
    /// Radians
    pub angle: f64,
    /// px/ms
    pub speed: f64,
}

impl AngleMover {
    /// `speed` in px/s.
    pub fn new(angle: f64, speed: f64) -> Self {
        Self {
            angle,
            speed: speed / 1000.0,
        }
    }

    /// Movement over `delta` ms.
    pub fn step(&self, delta: f64) -> Point {
        if self.angle.is_nan() {
            return Point::ZERO;
        }
        Point::circle(self.angle) * (self.speed * delta)
    }

    /// Reverses the horizontal direction.
    pub fn flip(&mut self) {
        self.angle = wrap_angle(mirror(self.angle, PI90));
    }

    /// Reverses the vertical direction.
    pub fn flop(&mut self) {
        self.angle = wrap_angle(mirror(self.angle, PI180));
    }

    /// Bounces off a surface facing `pivot`: if the current direction does
    /// not already lie within the half turn centered on `pivot`, it is
    /// mirrored across the surface line. Bouncing west (PI) off a surface
    /// facing PI/4 leads to PI/2.
    pub fn flap(&mut self, pivot: f64) {
        if pivot.is_nan() {
            return;
        }
        let surface = pivot - PI90;
        if in_angle(self.angle, surface, surface + PI180) {
            return;
        }
        self.angle = wrap_angle(mirror(self.angle, surface));
    }
}

impl Drift for AngleMover {
    fn drift(&mut self, _stage: &mut Stage, position: &mut Point, delta: f64) -> Result<()> {
        *position += self.step(delta);
        Ok(())
    }
}

impl Behavior for AngleMover {
    fn primes(&self) -> bool {
        true
    }

    fn behave(&mut self, cx: &mut Cx<'_>, delta: f64) -> Result<()> {
        let step = self.step(delta);
        *cx.position_mut()? += step;
        Ok(())
    }

    fn speed_mut(&mut self) -> Option<&mut f64> {
        Some(&mut self.speed)
    }
}

/// Follows a walker rail, one way over `duration` ms. Only the change since
/// the previous frame is applied, so the host can still be pushed around
/// while walking; the walker offset plays no part.
pub struct WalkMover {
    walker: Box<dyn Walker>,
    /// ms for progress 0.0 to 1.0
    pub duration: f64,
    /// Bid own removal once progress reaches 1.0
    pub autoremove: bool,
    passed: f64,
    previous: Point,
}

impl WalkMover {
    pub fn new(walker: impl Walker + 'static, duration: f64) -> Self {
        let previous = walker.get(0.0);
        Self {
            walker: Box::new(walker),
            duration,
            autoremove: false,
            passed: 0.0,
            previous,
        }
    }

    pub fn autoremove(mut self) -> Self {
        self.autoremove = true;
        self
    }

    pub fn progress(&self) -> f64 {
        self.passed / self.duration
    }
}

impl Behavior for WalkMover {
    fn primes(&self) -> bool {
        true
    }

    fn reset(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
        self.passed = 0.0;
        self.previous = self.walker.get(0.0);
        Ok(())
    }

    fn behave(&mut self, cx: &mut Cx<'_>, delta: f64) -> Result<()> {
        self.passed += delta;
        let mut progress = self.progress();
        if self.autoremove && progress >= 1.0 {
            progress = 1.0;
            cx.retire()?;
        }

        let point = self.walker.get(progress);
        *cx.position_mut()? += point - self.previous;
        self.previous = point;
        Ok(())
    }
}

/// Slows down the mover stored under `target` until it stops.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedFriction {
    /// Speed lost per ms, in px/ms
    pub gruel: f64,
    /// px/ms at or below which the mover stops dead
    pub stop: f64,
    pub target: Slot,
}

impl Default for SpeedFriction {
    fn default() -> Self {
        Self::new(1000.0, 1.0, Slot::Mover)
    }
}

impl SpeedFriction {
    /// `gruel` in px/s², `stop` in px/s.
    pub fn new(gruel: f64, stop: f64, target: Slot) -> Self {
        Self {
            gruel: gruel / 1000.0 / 1000.0,
            stop: stop / 1000.0,
            target,
        }
    }
}

impl Behavior for SpeedFriction {
    fn primes(&self) -> bool {
        true
    }

    fn behave(&mut self, cx: &mut Cx<'_>, delta: f64) -> Result<()> {
        let Some(mover) = cx.stage.behavior(cx.host, &self.target) else {
            return Ok(());
        };
        let Ok(mut tenant) = mover.try_borrow_mut() else {
            return Ok(());
        };
        if let Some(speed) = tenant.behavior_mut().speed_mut() {
            if *speed != 0.0 {
                *speed -= self.gruel * delta;
                if *speed <= self.stop {
                    *speed = 0.0;
                }
            }
        }
        Ok(())
    }
}

/// Keeps the host body inside `rink` (parent space) by bouncing it back
/// from every edge it crosses, then fires `on_bound` once per edge.
#[derive(Debug)]
pub struct InsideSkater {
    pub rink: Rect,
    on_bound: Rc<Delegate<Edge>>,
}

impl InsideSkater {
    pub fn new(rink: Rect) -> Self {
        Self {
            rink,
            on_bound: Rc::default(),
        }
    }

    pub fn on_bound(&self) -> Rc<Delegate<Edge>> {
        Rc::clone(&self.on_bound)
    }

    /// Correction pushing `body` back inside, with the edges it crossed.
    /// The body is mirrored across the edge, so the correction is twice the
    /// overshoot.
    pub fn bounce(&self, body: Rect) -> (Point, Vec<Edge>) {
        let rink = self.rink;
        let mut slide = Point::ZERO;
        let mut edges = Vec::new();
        if body.left() < rink.left() {
            slide.x = (rink.left() - body.left()) * 2.0;
            edges.push(Edge::Left);
        }
        if body.top() < rink.top() {
            slide.y = (rink.top() - body.top()) * 2.0;
            edges.push(Edge::Top);
        }
        if rink.right() <= body.right() {
            slide.x = (rink.right() - body.right()) * 2.0;
            edges.push(Edge::Right);
        }
        if rink.bottom() <= body.bottom() {
            slide.y = (rink.bottom() - body.bottom()) * 2.0;
            edges.push(Edge::Bottom);
        }
        (slide, edges)
    }
}

impl Behavior for InsideSkater {
    fn after(&mut self, cx: &mut Cx<'_>) -> Result<()> {
        let body = cx.body_rect()?;
        let body = cx.node()?.parent_coord(body).normalize();
        let (slide, edges) = self.bounce(body);
        *cx.position_mut()? += slide;

        let on_bound = Rc::clone(&self.on_bound);
        for edge in edges {
            on_bound.trigger(cx.stage, &edge)?;
        }
        Ok(())
    }
}
