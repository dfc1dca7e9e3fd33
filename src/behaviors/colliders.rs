//! Rigids and colliders.
//!
//! Everything taking part in a hit test carries a rigid under `Slot::Rigid`
//! (the default one follows the body). Only the side that wants to be told
//! carries a collider: one collider against ten rigids is ten tests, and the
//! host's role receives `collided(rival)` for each hit.

use tracing::warn;

use crate::core::behavior::capability;
use crate::core::{AntId, Behavior, Cx, Rigid, Slot, Stage};
use crate::error::Result;
use crate::geom::{Circle, Rect, Shape};

/// The host body rect.
#[derive(Debug, Clone, Copy, Default)]
pub struct RigidBehavior;

impl Rigid for RigidBehavior {
    fn shape(&self, stage: &Stage, host: AntId) -> Result<Shape> {
        Ok(Shape::Rect(stage.body_rect(host)?))
    }
}

impl Behavior for RigidBehavior {
    fn as_rigid(&self) -> Option<&dyn Rigid> {
        Some(self)
    }
}

/// A fixed rect, independent of the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectRigid {
    pub rect: Rect,
}

impl RectRigid {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Rigid for RectRigid {
    fn shape(&self, _stage: &Stage, _host: AntId) -> Result<Shape> {
        Ok(Shape::Rect(self.rect))
    }
}

impl Behavior for RectRigid {
    fn as_rigid(&self) -> Option<&dyn Rigid> {
        Some(self)
    }
}

/// The circle centered on the body whose diameter is the body width.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleRigid;

impl Rigid for CircleRigid {
    fn shape(&self, stage: &Stage, host: AntId) -> Result<Shape> {
        let body = stage.body_rect(host)?;
        Ok(Shape::Circle(Circle::new(body.center(), body.width() / 2.0)))
    }
}

impl Behavior for CircleRigid {
    fn as_rigid(&self) -> Option<&dyn Rigid> {
        Some(self)
    }
}

/// Rigid shape of `id` in its parent's space. Installs the default rigid if
/// there is none.
pub fn adapted_shape(stage: &mut Stage, id: AntId) -> Result<Shape> {
    let shared = stage.need_behavior(id, &Slot::Rigid)?;
    let tenant = shared.borrow();
    let shape = capability(&tenant, &Slot::Rigid, |b| b.as_rigid())?.shape(stage, id)?;
    let node = stage.get(id)?;
    let adapted = shape.adapt(|p| node.parent_coord(p), |r| node.parent_coord(r));
    Ok(adapted)
}

/// Whom a collider tests against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rivals {
    /// The other children of the host's parent
    Siblings,
    /// The children of some executant, minus the host
    ChildrenOf(AntId),
    List(Vec<AntId>),
}

impl Rivals {
    /// Current rival ids for `host`. The host itself is never its own rival.
    pub fn resolve(&self, stage: &Stage, host: AntId) -> Vec<AntId> {
        let childs_of = |id: Option<AntId>| -> Vec<AntId> {
            id.and_then(|id| stage.node(id))
                .map(|node| node.childs().values().copied().filter(|&c| c != host).collect())
                .unwrap_or_default()
        };
        match self {
            Rivals::Siblings => childs_of(stage.node(host).and_then(|n| n.parent())),
            Rivals::ChildrenOf(id) => childs_of(Some(*id)),
            Rivals::List(ids) => ids.iter().copied().filter(|&id| id != host).collect(),
        }
    }
}

/// Tests the host's rigid against its rivals after every update and reports
/// hits to the host's role. Host and rivals are compared in their respective
/// parent spaces, which only agree when they share a parent.
#[derive(Debug, Clone)]
pub struct ColliderBehavior {
    pub rivals: Rivals,
}

impl ColliderBehavior {
    pub fn new(rivals: Rivals) -> Self {
        Self { rivals }
    }
}

impl Behavior for ColliderBehavior {
    fn after(&mut self, cx: &mut Cx<'_>) -> Result<()> {
        let host = cx.host;
        let mine = adapted_shape(cx.stage, host)?;

        for rival in self.rivals.resolve(cx.stage, host) {
            if !cx.stage.contains(rival) {
                continue;
            }
            let theirs = adapted_shape(cx.stage, rival)?;
            if !mine.collide(&theirs) {
                continue;
            }

            let handled = cx.stage.with_role_taken(host, |role, cx| role.collided(cx, rival))?;
            if handled.is_none() {
                warn!(?host, ?rival, "collision with no role to report to");
            }
            if !cx.stage.contains(host) {
                break;
            }
        }
        Ok(())
    }
}
