//! Behaviors
//!
//! A behavior is a small capability object plugged into an executant under a
//! `Slot`. The host calls its hooks every frame:
//! - `before` in the stand phase, once the host's deferred commands are flushed
//! - `behave(delta)` in the update phase
//! - `after` in the stay phase
//!
//! A behavior that `primes()` gets `reset` instead of `behave` on its first
//! scheduled update after each attach, so setup runs once it is sure to
//! have a host and a frame. Priming is tracked by the `Tenant` wrapper
//! as an explicit `Readiness`.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::capability::{Body, Interactor, Renderer, Rigid, Sensor};
use super::leaf::{Command, LeafName, Pick};
use super::{AntId, Executant, Stage};
use crate::error::{Error, Result};
use crate::geom::{Point, Rect};

/// Downcasting support for trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Where a behavior sits in its host.
///
/// The well-known capability slots have their own variants; anything else
/// goes under a `Key`. `Index` names are handed out automatically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Body,
    Renderer,
    Sensor,
    Interactor,
    Rigid,
    Mover,
    Life,
    Friction,
    Anchor,
    Collider,
    Tween,
    Key(String),
    Index(u32),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::Body => "body",
            Slot::Renderer => "renderer",
            Slot::Sensor => "sensor",
            Slot::Interactor => "interactor",
            Slot::Rigid => "rigid",
            Slot::Mover => "mover",
            Slot::Life => "life",
            Slot::Friction => "friction",
            Slot::Anchor => "anchor",
            Slot::Collider => "collider",
            Slot::Tween => "tween",
            Slot::Key(key) => key,
            Slot::Index(n) => return write!(f, "{n}"),
        };
        f.write_str(name)
    }
}

impl LeafName for Slot {
    fn nth(n: u32) -> Self {
        Slot::Index(n)
    }
}

impl From<&str> for Slot {
    fn from(key: &str) -> Self {
        Slot::Key(key.to_string())
    }
}

/// Per-frame context handed to behavior and role hooks.
pub struct Cx<'a> {
    pub stage: &'a mut Stage,
    /// The executant whose hook is running
    pub host: AntId,
    /// The behavior whose hook is running, if any
    tenant: Option<Shared>,
}

impl<'a> Cx<'a> {
    pub fn new(stage: &'a mut Stage, host: AntId) -> Self {
        Self {
            stage,
            host,
            tenant: None,
        }
    }

    pub(crate) fn for_tenant(stage: &'a mut Stage, host: AntId, tenant: &Shared) -> Self {
        Self {
            stage,
            host,
            tenant: Some(Rc::clone(tenant)),
        }
    }

    /// Queues removal of the running behavior from its host for the next
    /// stand phase. Does nothing outside a behavior hook or once the host
    /// is destroyed.
    pub fn retire(&mut self) -> Result<()> {
        match &self.tenant {
            Some(_) if !self.stage.contains(self.host) => Ok(()),
            Some(tenant) => {
                let command = Command::Remove(Pick::Leaf(Rc::clone(tenant)));
                self.stage.bid_behavior(self.host, command)
            }
            None => Ok(()),
        }
    }

    pub fn node(&self) -> Result<&Executant> {
        self.stage.get(self.host)
    }

    pub fn node_mut(&mut self) -> Result<&mut Executant> {
        self.stage.get_mut(self.host)
    }

    pub fn position(&self) -> Result<Point> {
        Ok(self.node()?.position)
    }

    pub fn position_mut(&mut self) -> Result<&mut Point> {
        Ok(&mut self.node_mut()?.position)
    }

    /// Host body rect in host-local space.
    pub fn body_rect(&self) -> Result<Rect> {
        self.stage.body_rect(self.host)
    }
}

pub trait Behavior: AsAny {
    /// Called with `Some(host)` when stored in a host and with `None` when
    /// taken out again.
    fn attached(&mut self, _host: Option<AntId>) {}

    /// Whether to run `reset` in place of the first `behave` after attach.
    fn primes(&self) -> bool {
        false
    }

    fn before(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
        Ok(())
    }

    fn behave(&mut self, _cx: &mut Cx<'_>, _delta: f64) -> Result<()> {
        Ok(())
    }

    fn after(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
        Ok(())
    }

    fn as_body(&self) -> Option<&dyn Body> {
        None
    }

    fn as_renderer(&self) -> Option<&dyn Renderer> {
        None
    }

    fn as_sensor(&self) -> Option<&dyn Sensor> {
        None
    }

    fn as_interactor(&self) -> Option<&dyn Interactor> {
        None
    }

    fn as_rigid(&self) -> Option<&dyn Rigid> {
        None
    }

    /// Speed a friction behavior may slow down, in px/ms.
    fn speed_mut(&mut self) -> Option<&mut f64> {
        None
    }
}

/// Lifecycle of an installed behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Not attached to any host
    Detached,
    /// Attached; the next update runs `reset` instead of `behave`
    Primed,
    /// Attached; updates run `behave`
    Running,
}

/// A behavior as stored in a host, with its readiness.
pub struct Tenant {
    readiness: Readiness,
    behavior: Box<dyn Behavior>,
}

/// Shared handle to an installed behavior. Hosts, snapshots and queued
/// commands all point at the same tenant.
pub type Shared = Rc<RefCell<Tenant>>;

/// Wraps a behavior for installation.
pub fn share(behavior: impl Behavior) -> Shared {
    Rc::new(RefCell::new(Tenant::new(behavior)))
}

impl Tenant {
    pub fn new(behavior: impl Behavior) -> Self {
        Self::boxed(Box::new(behavior))
    }

    pub fn boxed(behavior: Box<dyn Behavior>) -> Self {
        Self {
            readiness: Readiness::Detached,
            behavior,
        }
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Requests a `reset` before the next `behave`.
    pub fn prime(&mut self) {
        if self.readiness != Readiness::Detached {
            self.readiness = Readiness::Primed;
        }
    }

    pub fn behavior(&self) -> &dyn Behavior {
        self.behavior.as_ref()
    }

    pub fn behavior_mut(&mut self) -> &mut dyn Behavior {
        self.behavior.as_mut()
    }

    pub fn get<T: Behavior>(&self) -> Option<&T> {
        self.behavior.as_ref().as_any().downcast_ref()
    }

    pub fn get_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.behavior.as_mut().as_any_mut().downcast_mut()
    }

    pub(crate) fn attach(&mut self, host: Option<AntId>) {
        self.behavior.attached(host);
        self.readiness = match host {
            None => Readiness::Detached,
            Some(_) if self.behavior.primes() => Readiness::Primed,
            Some(_) => Readiness::Running,
        };
    }

    pub(crate) fn before(&mut self, cx: &mut Cx<'_>) -> Result<()> {
        match self.readiness {
            Readiness::Detached => Ok(()),
            _ => self.behavior.before(cx),
        }
    }

    pub(crate) fn behave(&mut self, cx: &mut Cx<'_>, delta: f64) -> Result<()> {
        match self.readiness {
            Readiness::Detached => Ok(()),
            Readiness::Primed => {
                self.readiness = Readiness::Running;
                self.behavior.reset(cx)
            }
            Readiness::Running => self.behavior.behave(cx, delta),
        }
    }

    pub(crate) fn after(&mut self, cx: &mut Cx<'_>) -> Result<()> {
        match self.readiness {
            Readiness::Detached => Ok(()),
            _ => self.behavior.after(cx),
        }
    }
}

impl fmt::Debug for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tenant")
            .field("readiness", &self.readiness)
            .finish_non_exhaustive()
    }
}

/// Borrows a tenant's capability or fails with a missing-leaf error naming `slot`.
pub(crate) fn capability<'t, C: ?Sized>(
    tenant: &'t Tenant,
    slot: &Slot,
    pick: impl FnOnce(&'t dyn Behavior) -> Option<&'t C>,
) -> Result<&'t C> {
    pick(tenant.behavior()).ok_or_else(|| Error::missing(slot))
}
