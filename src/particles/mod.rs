//! Particles
//!
//! Swarms of tiny drawn things too numerous to be executants each. A
//! particle is a bare position with a look and a few drift behaviors; a
//! `Mistant` role owns a swarm, flows it every update and paints it in
//! place of a renderer.
//!
//! - fuzzy: random ranges for particle recipes
//! - clocker: interval timer reporting the excess time of every clock

pub mod clocker;
pub mod fuzzy;

pub use clocker::{Clocker, Slowdown};
pub use fuzzy::FuzzyValue;

use rand::rngs::SmallRng;
use rand::Rng;

use crate::behaviors::{AngleMover, Drift, TimerBehavior};
use crate::core::leaf::unobserved;
use crate::core::{AntId, Command, Cx, LeafManager, Pick, Role, Slot, Stage};
use crate::error::Result;
use crate::geom::angle::PI360;
use crate::geom::{Point, Rect};
use crate::render::{Canvas, Color, Piece};

/// How a particle is drawn, centered on its position.
#[derive(Debug, Clone, PartialEq)]
pub enum Look {
    Piece(Piece),
    Dot { radius: f64, color: Color },
    /// Not drawn at all
    Unseen,
}

impl Look {
    pub fn plash(&self, canvas: &mut dyn Canvas, position: Point) {
        match self {
            Look::Piece(piece) => canvas.draw_piece(piece, Rect::by_center(position, piece.size())),
            Look::Dot { radius, color } => canvas.fill_circle(position, *radius, *color),
            Look::Unseen => {}
        }
    }
}

/// A drawn point driven by `Drift` behaviors, in the local space of the
/// node that owns it.
pub struct Particle {
    pub position: Point,
    pub look: Look,
    drifts: LeafManager<Slot, Box<dyn Drift>>,
}

impl Particle {
    pub fn new(look: Look) -> Self {
        Self {
            position: Point::ZERO,
            look,
            drifts: LeafManager::new(),
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Installs `drift` under `slot` right away.
    pub fn with_drift(mut self, slot: Slot, drift: impl Drift + 'static) -> Self {
        self.drifts.set(Some(Box::new(drift)), Some(slot), unobserved);
        self
    }

    /// Queues `drift` for the next `flow`.
    pub fn bid(&mut self, slot: Slot, drift: impl Drift + 'static) {
        self.drifts.bid(Command::Set {
            leaf: Box::new(drift),
            name: Some(slot),
        });
    }

    /// Queues removal of the drift under `slot`.
    pub fn bid_remove(&mut self, slot: Slot) {
        self.drifts.bid(Command::Remove(Pick::Name(slot)));
    }

    pub fn drifts(&self) -> &LeafManager<Slot, Box<dyn Drift>> {
        &self.drifts
    }

    /// Flushes queued drift changes, then drifts by `delta` ms. Returns
    /// whether the particle is still alive: it dies once the drift under
    /// `Slot::Life` expires.
    pub fn flow(&mut self, stage: &mut Stage, delta: f64) -> Result<bool> {
        self.drifts.act(unobserved);
        for drift in self.drifts.values_mut() {
            drift.drift(stage, &mut self.position, delta)?;
        }
        let expired = self.drifts.get(&Slot::Life).is_some_and(|life| life.expired());
        Ok(!expired)
    }

    pub fn plash(&self, canvas: &mut dyn Canvas) {
        self.look.plash(canvas, self.position);
    }
}

/// Recipe for particles flying off the origin in a random direction.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionParticle {
    pub look: Look,
    /// ms, drawn as an integer
    pub lifetime: FuzzyValue,
    /// px/s
    pub speed: FuzzyValue,
    /// Radians, the full circle unless narrowed
    pub angle: FuzzyValue,
}

impl EmissionParticle {
    pub fn new(look: Look, lifetime: impl Into<FuzzyValue>, speed: impl Into<FuzzyValue>) -> Self {
        Self {
            look,
            lifetime: lifetime.into(),
            speed: speed.into(),
            angle: FuzzyValue::new(0.0, PI360),
        }
    }

    pub fn with_angle(mut self, angle: impl Into<FuzzyValue>) -> Self {
        self.angle = angle.into();
        self
    }

    /// A fresh particle at the origin with a `Mover` and a `Life` drift.
    pub fn hatch(&self, rng: &mut impl Rng) -> Particle {
        let mover = AngleMover::new(self.angle.get(rng), self.speed.get(rng));
        let life = TimerBehavior::new(self.lifetime.int(rng) as f64);
        Particle::new(self.look.clone())
            .with_drift(Slot::Mover, mover)
            .with_drift(Slot::Life, life)
    }
}

/// Particle factory of a mistant.
pub type Egg = Box<dyn FnMut(&mut SmallRng) -> Particle>;

/// A role owning a swarm of particles.
///
/// Plain mistants only hold what is added to them. A gushing one hatches a
/// particle from its egg on every `increment`; a clocked one also increments
/// on every clock kick and flows the newborn by the time elapsed since the
/// kick, so emission stays even at low frame rates.
#[derive(Default)]
pub struct Mistant {
    particles: Vec<Particle>,
    egg: Option<Egg>,
    clock: Option<Clocker>,
}

impl Mistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gush(egg: impl FnMut(&mut SmallRng) -> Particle + 'static) -> Self {
        Self {
            egg: Some(Box::new(egg)),
            ..Self::default()
        }
    }

    pub fn clocked(egg: impl FnMut(&mut SmallRng) -> Particle + 'static, clock: Clocker) -> Self {
        Self {
            clock: Some(clock),
            ..Self::gush(egg)
        }
    }

    pub fn add(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Hatches one particle. False when there is no egg.
    pub fn increment(&mut self, rng: &mut SmallRng) -> bool {
        let Some(egg) = &mut self.egg else {
            return false;
        };
        let particle = egg(rng);
        self.particles.push(particle);
        true
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Flows every particle by `delta` ms and drops the dead ones.
    pub fn flow(&mut self, stage: &mut Stage, delta: f64) -> Result<()> {
        let mut i = 0;
        while i < self.particles.len() {
            if self.particles[i].flow(stage, delta)? {
                i += 1;
            } else {
                self.particles.remove(i);
            }
        }
        Ok(())
    }

    fn clock(&mut self, stage: &mut Stage, delta: f64) -> Result<()> {
        let Some(clock) = &mut self.clock else {
            return Ok(());
        };
        let kicks = clock.time(stage.rng(), delta);
        for excess in kicks {
            if !self.increment(stage.rng()) {
                break;
            }
            let alive = match self.particles.last_mut() {
                Some(particle) => particle.flow(stage, excess)?,
                None => true,
            };
            if !alive {
                self.particles.pop();
            }
        }
        Ok(())
    }
}

impl Role for Mistant {
    fn update(&mut self, cx: &mut Cx<'_>) -> Result<()> {
        let delta = cx.stage.delta;
        self.flow(cx.stage, delta)?;
        self.clock(cx.stage, delta)
    }

    fn depict(&self, canvas: &mut dyn Canvas, _stage: &Stage, _host: AntId) -> bool {
        for particle in &self.particles {
            particle.plash(canvas);
        }
        true
    }
}
