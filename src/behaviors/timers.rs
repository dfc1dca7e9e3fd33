//! Timers and tweens.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::movers::Drift;
use crate::core::{Behavior, Cx, Delegate, Executant, Stage};
use crate::error::Result;
use crate::geom::Point;
use crate::motion::Polator;

/// Counts down `time` ms and fires `on_timeout` once. Afterwards the
/// remaining time is NaN.
#[derive(Debug)]
pub struct TimerBehavior {
    /// Remaining ms, NaN once timed out
    pub time: f64,
    on_timeout: Rc<Delegate<()>>,
}

impl TimerBehavior {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            on_timeout: Rc::default(),
        }
    }

    pub fn on_timeout(&self) -> Rc<Delegate<()>> {
        Rc::clone(&self.on_timeout)
    }

    pub fn is_timeout(&self) -> bool {
        self.time.is_nan()
    }

    /// Advances by `delta` ms and fires on expiry.
    pub fn tick(&mut self, stage: &mut Stage, delta: f64) -> Result<()> {
        self.time -= delta;
        // NaN compares false, so a spent timer stays quiet
        if self.time <= 0.0 {
            self.time = f64::NAN;
            Rc::clone(&self.on_timeout).trigger(stage, &())?;
        }
        Ok(())
    }
}

impl Drift for TimerBehavior {
    fn drift(&mut self, stage: &mut Stage, _position: &mut Point, delta: f64) -> Result<()> {
        self.tick(stage, delta)
    }

    fn expired(&self) -> bool {
        self.is_timeout()
    }
}

impl Behavior for TimerBehavior {
    fn behave(&mut self, cx: &mut Cx<'_>, delta: f64) -> Result<()> {
        self.tick(cx.stage, delta)
    }
}

/// A numeric field of an executant a tween can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    PositionX,
    PositionY,
    ScaleX,
    ScaleY,
}

impl Property {
    pub fn get(self, ant: &Executant) -> f64 {
        match self {
            Property::PositionX => ant.position.x,
            Property::PositionY => ant.position.y,
            Property::ScaleX => ant.scale.x,
            Property::ScaleY => ant.scale.y,
        }
    }

    pub fn add(self, ant: &mut Executant, change: f64) {
        match self {
            Property::PositionX => ant.position.x += change,
            Property::PositionY => ant.position.y += change,
            Property::ScaleX => ant.scale.x += change,
            Property::ScaleY => ant.scale.y += change,
        }
    }
}

/// Drives a host property along `polator * distance` over `duration` ms.
///
/// Each frame only adds the change since the previous one, so other writers
/// to the same property are not overridden. Restarts from zero on every
/// attach.
#[derive(Debug, Clone)]
pub struct TweenBehavior {
    pub target: Property,
    pub distance: f64,
    /// ms for progress 0.0 to 1.0
    pub duration: f64,
    pub polator: Polator,
    /// Bid own removal once progress reaches 1.0
    pub autoremove: bool,
    passed: f64,
    previous: f64,
}

impl TweenBehavior {
    pub fn new(target: Property, distance: f64, duration: f64, polator: impl Into<Polator>) -> Self {
        Self {
            target,
            distance,
            duration,
            polator: polator.into(),
            autoremove: false,
            passed: 0.0,
            previous: 0.0,
        }
    }

    pub fn autoremove(mut self) -> Self {
        self.autoremove = true;
        self
    }
}

impl Behavior for TweenBehavior {
    fn primes(&self) -> bool {
        true
    }

    fn reset(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
        self.passed = 0.0;
        self.previous = self.polator.get(0.0) * self.distance;
        Ok(())
    }

    fn behave(&mut self, cx: &mut Cx<'_>, delta: f64) -> Result<()> {
        self.passed += delta;
        let mut progress = self.passed / self.duration;
        if self.autoremove && progress >= 1.0 {
            progress = 1.0;
            cx.retire()?;
        }

        let value = self.polator.get(progress) * self.distance;
        let change = value - self.previous;
        self.previous = value;
        self.target.add(cx.node_mut()?, change);
        Ok(())
    }
}
