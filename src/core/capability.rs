//! Capabilities
//!
//! The interfaces other subsystems look for in a node's behaviors. A
//! behavior offers one by overriding the matching `Behavior::as_*` accessor.
//! Any capability method may be called on a node by a different node (a
//! collider reads its rivals' rigids, an anchor listens to another node's
//! sensor), so none of them get exclusive access to their own host. Only
//! interactors get a mutable stage, because touches run role handlers.

use std::rc::Rc;

use super::delegate::Delegate;
use super::{AntId, Stage};
use crate::error::Result;
use crate::geom::{Point, Rect, Shape};
use crate::render::Canvas;

/// Occupied area in host-local space. Layout, anchoring, collision and
/// hit-testing all go through it.
pub trait Body {
    fn rect(&self, stage: &Stage, host: AntId) -> Result<Rect>;
}

/// Draws the host. Called once per matching layer while the canvas holds the
/// host's local transform; must not change the tree.
pub trait Renderer {
    fn render(&self, canvas: &mut dyn Canvas, stage: &Stage, host: AntId);

    /// Natural size of what gets drawn, if it has one.
    fn extent(&self) -> Option<Point> {
        None
    }
}

/// Payload of a sensor notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sense {
    /// Host body in root space, normalized
    pub rect: Rect,
    pub host: AntId,
}

/// Broadcasts changes of the host body in root space.
pub trait Sensor {
    fn on_sense(&self) -> Rc<Delegate<Sense>>;
}

/// What a node answers to at a touched point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    /// Taps (and hands) only
    Tap,
    /// Drags only
    Drag,
    /// Both taps and drags
    All,
    /// Took the touch itself but answers no gesture
    Processed,
    /// Sensitive here but not listening
    Silent,
}

impl Reach {
    pub fn taps(self) -> bool {
        matches!(self, Reach::Tap | Reach::All)
    }

    pub fn drags(self) -> bool {
        matches!(self, Reach::Drag | Reach::All)
    }
}

/// A completed gesture, in the receiver's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Short touch, delivered on the next update
    Tap { begin: Point },
    /// Same as a tap but delivered right away from the touch-end handler
    Hand { begin: Point },
    /// Accumulated drag vector since the last update
    Drag { begin: Point, movement: Point },
}

/// Receives touches and gestures.
pub trait Interactor {
    /// Handles the raw touch at `point` (host-local) and says which
    /// gestures the host wants. `None` when the point is not sensitive.
    fn touch(&self, stage: &mut Stage, host: AntId, point: Point) -> Result<Option<Reach>>;

    fn interact(&self, stage: &mut Stage, host: AntId, interaction: Interaction) -> Result<()>;
}

/// Collision shape in host-local space.
pub trait Rigid {
    fn shape(&self, stage: &Stage, host: AntId) -> Result<Shape>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reach_flags() {
        assert!(Reach::All.taps() && Reach::All.drags());
        assert!(Reach::Tap.taps() && !Reach::Tap.drags());
        assert!(!Reach::Processed.taps() && !Reach::Silent.drags());
    }
}
